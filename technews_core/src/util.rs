use crate::{Error, Result};
use std::sync::OnceLock;

pub fn get_or_init_once_lock<T>(cell: &OnceLock<T>, f: impl FnOnce() -> Result<T>) -> Result<&T> {
    if let Some(val) = cell.get() {
        return Ok(val);
    }
    let val = f()?;
    let _ = cell.set(val);
    cell.get()
        .ok_or_else(|| Error::Internal("cell was set but is empty".to_string()))
}
