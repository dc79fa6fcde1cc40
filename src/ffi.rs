//! FFI bindings for Step Calendar
//!
//! This module provides C-compatible functions for calling the calendar engine
//! from a host UI. All functions take null-terminated C strings and return
//! allocated memory that must be freed with `stepcal_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::CalendarConfig;
use crate::error::CalendarError;
use crate::pipeline::CalendarProcessor;
use crate::render::{render_text, RenderOptions};
use crate::schema::{Category, RawEvent, RawEventAdapter};
use crate::types::CalendarModel;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Accept either a JSON array or NDJSON
fn parse_events(text: &str) -> Result<Vec<RawEvent>, CalendarError> {
    if text.trim_start().starts_with('[') {
        RawEventAdapter::parse_array(text)
    } else {
        RawEventAdapter::parse_ndjson(text)
    }
}

/// NULL category means the default (step count)
unsafe fn processor_for(category: *const c_char) -> Result<CalendarProcessor, CalendarError> {
    let mut config = CalendarConfig::default();
    if let Some(name) = cstr_to_string(category) {
        config = config.with_category(Category::from_name(&name));
    }
    CalendarProcessor::with_config(config)
}

/// Hand the output to the caller, or record the error and return NULL.
fn into_c_result(result: Result<String, CalendarError>) -> *mut c_char {
    match result {
        Ok(out) => string_to_cstr(&out),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

fn model_to_json(model: &CalendarModel) -> Result<String, CalendarError> {
    Ok(serde_json::to_string(model)?)
}

/// Build a calendar model from raw events and return it as JSON.
///
/// # Safety
/// - `events` must be a valid null-terminated C string (JSON array or NDJSON).
/// - `category` must be a valid null-terminated C string or NULL.
/// - Returns a newly allocated string that must be freed with `stepcal_free_string`.
/// - Returns NULL on error; call `stepcal_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn stepcal_build_calendar(
    events: *const c_char,
    category: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(events_str) = cstr_to_string(events) else {
        set_last_error("Invalid events string pointer");
        return ptr::null_mut();
    };

    into_c_result(processor_for(category).and_then(|processor| {
        let events = parse_events(&events_str)?;
        model_to_json(&processor.process_events(&events)?)
    }))
}

/// Rebuild a calendar model from a saved day-series snapshot.
///
/// # Safety
/// - `snapshot` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `stepcal_free_string`.
/// - Returns NULL on error; call `stepcal_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn stepcal_restore_calendar(snapshot: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(snapshot_str) = cstr_to_string(snapshot) else {
        set_last_error("Invalid snapshot string pointer");
        return ptr::null_mut();
    };

    into_c_result(
        CalendarProcessor::new()
            .restore_snapshot(&snapshot_str)
            .and_then(|model| model_to_json(&model)),
    )
}

/// Render raw events as a plain-text heatmap.
///
/// # Safety
/// - `events` must be a valid null-terminated C string (JSON array or NDJSON).
/// - `category` must be a valid null-terminated C string or NULL.
/// - Returns a newly allocated string that must be freed with `stepcal_free_string`.
/// - Returns NULL on error; call `stepcal_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn stepcal_render_text(
    events: *const c_char,
    category: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(events_str) = cstr_to_string(events) else {
        set_last_error("Invalid events string pointer");
        return ptr::null_mut();
    };

    into_c_result(processor_for(category).and_then(|processor| {
        let events = parse_events(&events_str)?;
        let model = processor.process_events(&events)?;
        Ok(render_text(&model, &RenderOptions::from(processor.config())))
    }))
}

/// Free a string returned by Step Calendar functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Step Calendar function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn stepcal_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Step Calendar call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn stepcal_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn stepcal_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
