//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] with typed scalar entries.
//!
//! - On ESP32 each value maps to a native NVS entry (`u32`, `u64`, booleans
//!   as `u8`). A batch is committed once with `nvs_commit()`.
//! - NVS keys are limited to 15 bytes; longer keys are truncated. The feeder
//!   keys stay distinct after truncation (`compteurCroquet`, `compteurCroquin`).
//! - The simulation backend keeps values in a map keyed by `namespace::key`.

use crate::app::ports::{StorageError, StoragePort, StoredValue};
use log::info;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::warn;

/// Longest key or namespace NVS accepts, excluding the NUL.
const NVS_KEY_MAX: usize = 15;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, StoredValue>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    /// NUL-terminated, truncated copy of a key or namespace.
    fn c_key(name: &str) -> [u8; NVS_KEY_MAX + 1] {
        let mut buf = [0u8; NVS_KEY_MAX + 1];
        let bytes = name.as_bytes();
        let len = bytes.len().min(NVS_KEY_MAX);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        let ns = Self::c_key(namespace);
        let k = Self::c_key(key);
        let trim = |b: &[u8]| {
            let end = b.iter().position(|&c| c == 0).unwrap_or(b.len());
            String::from_utf8_lossy(&b[..end]).into_owned()
        };
        format!("{}::{}", trim(&ns), trim(&k))
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_value(&self, namespace: &str, key: &str) -> Option<StoredValue> {
        self.store
            .borrow()
            .get(&Self::composite_key(namespace, key))
            .copied()
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns_buf = Self::c_key(namespace);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    /// Read one scalar with `getter`; a missing key or namespace is `None`.
    #[cfg(target_os = "espidf")]
    fn read_scalar<T: Default>(
        namespace: &str,
        key: &str,
        getter: unsafe extern "C" fn(nvs_handle_t, *const core::ffi::c_char, *mut T) -> esp_err_t,
    ) -> Result<Option<T>, StorageError> {
        let key_buf = Self::c_key(key);
        let result = Self::with_nvs_handle(namespace, false, |handle| {
            let mut value = T::default();
            let ret = unsafe { getter(handle, key_buf.as_ptr() as *const _, &mut value) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(value)
        });
        match result {
            Ok(v) => Ok(Some(v)),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Ok(None),
            Err(e) if e == ESP_ERR_NVS_TYPE_MISMATCH => Err(StorageError::TypeMismatch),
            Err(e) => {
                warn!("NvsAdapter: read {}::{} failed ({})", namespace, key, e);
                Err(StorageError::IoError)
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl StoragePort for NvsAdapter {
    fn read_u32(&self, namespace: &str, key: &str) -> Result<Option<u32>, StorageError> {
        match self.read_value(namespace, key) {
            None => Ok(None),
            Some(StoredValue::U32(v)) => Ok(Some(v)),
            Some(_) => Err(StorageError::TypeMismatch),
        }
    }

    fn read_u64(&self, namespace: &str, key: &str) -> Result<Option<u64>, StorageError> {
        match self.read_value(namespace, key) {
            None => Ok(None),
            Some(StoredValue::U64(v)) => Ok(Some(v)),
            Some(_) => Err(StorageError::TypeMismatch),
        }
    }

    fn read_bool(&self, namespace: &str, key: &str) -> Result<Option<bool>, StorageError> {
        match self.read_value(namespace, key) {
            None => Ok(None),
            Some(StoredValue::Bool(v)) => Ok(Some(v)),
            Some(_) => Err(StorageError::TypeMismatch),
        }
    }

    fn write_batch(
        &mut self,
        namespace: &str,
        entries: &[(&str, StoredValue)],
    ) -> Result<(), StorageError> {
        let mut store = self.store.borrow_mut();
        for (key, value) in entries {
            store.insert(Self::composite_key(namespace, key), *value);
        }
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
impl StoragePort for NvsAdapter {
    fn read_u32(&self, namespace: &str, key: &str) -> Result<Option<u32>, StorageError> {
        Self::read_scalar(namespace, key, nvs_get_u32)
    }

    fn read_u64(&self, namespace: &str, key: &str) -> Result<Option<u64>, StorageError> {
        Self::read_scalar(namespace, key, nvs_get_u64)
    }

    fn read_bool(&self, namespace: &str, key: &str) -> Result<Option<bool>, StorageError> {
        Ok(Self::read_scalar::<u8>(namespace, key, nvs_get_u8)?.map(|v| v != 0))
    }

    fn write_batch(
        &mut self,
        namespace: &str,
        entries: &[(&str, StoredValue)],
    ) -> Result<(), StorageError> {
        let result = Self::with_nvs_handle(namespace, true, |handle| {
            for (key, value) in entries {
                let key_buf = Self::c_key(key);
                let k = key_buf.as_ptr() as *const _;
                let ret = unsafe {
                    match *value {
                        StoredValue::U32(v) => nvs_set_u32(handle, k, v),
                        StoredValue::U64(v) => nvs_set_u64(handle, k, v),
                        StoredValue::Bool(v) => nvs_set_u8(handle, k, u8::from(v)),
                    }
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        });
        match result {
            Ok(()) => Ok(()),
            Err(e) if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE => Err(StorageError::Full),
            Err(e) => {
                warn!("NvsAdapter: write to {} failed ({})", namespace, e);
                Err(StorageError::IoError)
            }
        }
    }
}
