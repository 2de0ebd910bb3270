use libc::{c_char, c_int, c_uchar};

pub use libz_sys::{
    Z_BUF_ERROR, Z_DATA_ERROR, Z_MEM_ERROR, Z_NEED_DICT, Z_OK, Z_STREAM_END, Z_STREAM_ERROR,
    Z_VERSION_ERROR,
};

pub const ZSHIM_DEFLATE: c_int = 0;
pub const ZSHIM_INFLATE: c_int = 1;

#[repr(C)]
pub struct ZStream {
    _private: [u8; 0],
}

extern "C" {
    pub fn zshim_create(kind: c_int, level: c_int, out: *mut *mut ZStream) -> c_int;
    pub fn zshim_deflate(
        stream: *mut ZStream,
        channel: *mut u32,
        src: *const c_uchar,
        src_len: u32,
        dst: *mut c_uchar,
        dst_len: u32,
        finish: c_int,
    ) -> c_int;
    pub fn zshim_inflate(
        stream: *mut ZStream,
        channel: *mut u32,
        src: *const c_uchar,
        src_len: u32,
        dst: *mut c_uchar,
        dst_len: u32,
    ) -> c_int;
    pub fn zshim_message(stream: *const ZStream) -> *const c_char;
    pub fn zshim_free(kind: c_int, stream: *mut ZStream) -> c_int;
}
