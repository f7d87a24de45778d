//! C-compatible embedding boundary.
//!
//! The single entry point mirrors the library's [`compile`]: a
//! null-terminated grammar text buffer in, an opaque caller-owned engine
//! handle out. Failures return null and record a message plus a kind code
//! in a thread-local slot; panics are caught at the boundary and reported
//! the same way, never unwound across it.
//!
//! # Safety
//!
//! All pointer-taking functions are `unsafe`: callers must pass valid
//! null-terminated buffers, must release handles exactly once through
//! [`gbnf_grammar_free`], and must not use a handle after freeing it.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use crate::builder::compile;
use crate::engine::GrammarEngine;
use crate::errors::{ErrorCategory, GbnfError};

/// No error recorded.
pub const GBNF_ERROR_NONE: c_int = 0;
/// The grammar text violates GBNF syntax.
pub const GBNF_ERROR_PARSE: c_int = 1;
/// The grammar parsed but defines no `root` rule.
pub const GBNF_ERROR_MISSING_ROOT: c_int = 2;
/// The rule table is structurally invalid for the engine.
pub const GBNF_ERROR_CONSTRUCTION: c_int = 3;
/// Boundary misuse: null pointer, invalid UTF-8, or a caught panic.
pub const GBNF_ERROR_BOUNDARY: c_int = 4;

thread_local! {
    static LAST_ERROR: RefCell<Option<(CString, c_int)>> = RefCell::new(None);
}

fn set_last_error(message: String, kind: c_int) {
    let message = CString::new(message)
        .unwrap_or_else(|_| CString::new("error message contained a nul byte").unwrap());
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some((message, kind)));
}

fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

fn record_error(error: &GbnfError) {
    let kind = match error.category() {
        ErrorCategory::Parse => GBNF_ERROR_PARSE,
        ErrorCategory::MissingSymbol => GBNF_ERROR_MISSING_ROOT,
        ErrorCategory::Construction => GBNF_ERROR_CONSTRUCTION,
    };
    set_last_error(error.to_string(), kind);
}

/// Compiles grammar text into an opaque engine handle.
///
/// Returns null on failure; [`gbnf_last_error`] and [`gbnf_error_kind`]
/// describe what went wrong. The returned handle is owned exclusively by
/// the caller and must eventually be passed to [`gbnf_grammar_free`].
///
/// # Safety
/// `text` must be a valid null-terminated UTF-8 buffer, readable for the
/// duration of the call. It is not retained.
#[no_mangle]
pub unsafe extern "C" fn gbnf_grammar_from_text(text: *const c_char) -> *mut GrammarEngine {
    clear_last_error();
    if text.is_null() {
        set_last_error("grammar text is null".into(), GBNF_ERROR_BOUNDARY);
        return ptr::null_mut();
    }
    let text = match CStr::from_ptr(text).to_str() {
        Ok(text) => text,
        Err(_) => {
            set_last_error("grammar text is not valid UTF-8".into(), GBNF_ERROR_BOUNDARY);
            return ptr::null_mut();
        }
    };

    match panic::catch_unwind(|| compile(text)) {
        Ok(Ok(engine)) => Box::into_raw(Box::new(engine)),
        Ok(Err(error)) => {
            record_error(&error);
            ptr::null_mut()
        }
        Err(_) => {
            set_last_error(
                "internal panic during grammar compilation".into(),
                GBNF_ERROR_BOUNDARY,
            );
            ptr::null_mut()
        }
    }
}

/// Releases an engine handle. Null is a no-op.
///
/// # Safety
/// `grammar` must have come from [`gbnf_grammar_from_text`] and must not
/// be used again after this call.
#[no_mangle]
pub unsafe extern "C" fn gbnf_grammar_free(grammar: *mut GrammarEngine) {
    if grammar.is_null() {
        return;
    }
    drop(Box::from_raw(grammar));
}

/// Whether `text` is a complete match from the grammar's root rule.
///
/// Returns 1 on match, 0 on no match, -1 on error (see
/// [`gbnf_last_error`]).
///
/// # Safety
/// `grammar` must be a live handle from [`gbnf_grammar_from_text`];
/// `text` must be a valid null-terminated UTF-8 buffer.
#[no_mangle]
pub unsafe extern "C" fn gbnf_grammar_recognizes(
    grammar: *const GrammarEngine,
    text: *const c_char,
) -> c_int {
    clear_last_error();
    if grammar.is_null() {
        set_last_error("grammar handle is null".into(), GBNF_ERROR_BOUNDARY);
        return -1;
    }
    if text.is_null() {
        set_last_error("input text is null".into(), GBNF_ERROR_BOUNDARY);
        return -1;
    }
    let text = match CStr::from_ptr(text).to_str() {
        Ok(text) => text,
        Err(_) => {
            set_last_error("input text is not valid UTF-8".into(), GBNF_ERROR_BOUNDARY);
            return -1;
        }
    };

    let engine = &*grammar;
    match panic::catch_unwind(AssertUnwindSafe(|| engine.recognizes(text))) {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(_) => {
            set_last_error("internal panic during matching".into(), GBNF_ERROR_BOUNDARY);
            -1
        }
    }
}

/// Message describing the last failure on this thread, or null if the most
/// recent call succeeded. The pointer stays valid until the next FFI call
/// on the same thread.
#[no_mangle]
pub extern "C" fn gbnf_last_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(ptr::null(), |(message, _)| message.as_ptr())
    })
}

/// Kind code of the last failure on this thread (`GBNF_ERROR_*`), or
/// `GBNF_ERROR_NONE` if the most recent call succeeded.
#[no_mangle]
pub extern "C" fn gbnf_error_kind() -> c_int {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(GBNF_ERROR_NONE, |&(_, kind)| kind)
    })
}
