use std::ffi::{c_char, CStr, CString};

use crate::{Error, Result};

pub fn cstring_from_str(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::ModelLoad(format!("string contains a nul byte: {s:?}")))
}

pub fn cstr_to_string(ptr: *const c_char) -> String {
    unsafe {
        if ptr.is_null() {
            String::new()
        } else {
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }
}
