// This is free and unencumbered software released into the public domain.

use super::{CameraResult, CameraStatus};
use core::{mem::zeroed, ptr::null_mut};
use ndk_sys::{
    ACameraMetadata, ACameraMetadata_const_entry, ACameraMetadata_free,
    ACameraMetadata_getConstEntry, acamera_metadata_tag,
};

/// Static characteristics of one camera, freed on drop.
#[derive(Debug)]
pub struct CameraMetadata {
    pub(crate) handle: *mut ACameraMetadata,
}

impl Default for CameraMetadata {
    fn default() -> Self {
        Self { handle: null_mut() }
    }
}

impl Drop for CameraMetadata {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACameraMetadata_free(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl CameraMetadata {
    fn entry(&self, tag: acamera_metadata_tag) -> CameraResult<ACameraMetadata_const_entry> {
        let mut entry: ACameraMetadata_const_entry = unsafe { zeroed() };
        // See: https://developer.android.com/ndk/reference/group/camera#acamerametadata_getconstentry
        let status = unsafe { ACameraMetadata_getConstEntry(self.handle, tag.0, &mut entry) };
        CameraStatus::check(status)?;
        Ok(entry)
    }

    pub fn get_u8(&self, tag: acamera_metadata_tag) -> CameraResult<Vec<u8>> {
        let entry = self.entry(tag)?;
        if entry.count == 0 {
            return Ok(Vec::new());
        }
        let data = unsafe { core::slice::from_raw_parts(entry.data.u8_, entry.count as usize) };
        Ok(data.to_vec())
    }

    pub fn get_i32(&self, tag: acamera_metadata_tag) -> CameraResult<Vec<i32>> {
        let entry = self.entry(tag)?;
        if entry.count == 0 {
            return Ok(Vec::new());
        }
        let data = unsafe { core::slice::from_raw_parts(entry.data.i32_, entry.count as usize) };
        Ok(data.to_vec())
    }
}
