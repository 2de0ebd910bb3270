use libc::c_char;

extern "C" {
    pub fn zshim_version() -> *const c_char;
}
