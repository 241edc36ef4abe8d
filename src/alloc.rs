//! Trampoline page allocation and scoped protection changes.

use crate::error::{Error, Result};
use region::Protection;

/// Bytes reserved per trampoline: up to 15 bytes of relocated prolog,
/// plus a 5-byte tail `JMP rel32` back into the target.
pub const TRAMPOLINE_SIZE: usize = 20;

/// An executable page holding one relocated prolog and its tail jump.
///
/// Allocated read/write so the engine can fill it in, then flipped to
/// read/execute once its contents are final. The underlying mapping is
/// released when the `region::Allocation` drops.
pub struct TrampolinePage {
  memory: region::Allocation,
}

unsafe impl Send for TrampolinePage {}

impl TrampolinePage {
  pub fn new() -> Result<Self> {
    let memory = region::alloc(TRAMPOLINE_SIZE, Protection::READ_WRITE).map_err(Error::AllocFailed)?;
    Ok(TrampolinePage { memory })
  }

  pub fn as_ptr(&self) -> *const u8 {
    self.memory.as_ptr::<u8>()
  }

  pub fn as_mut_ptr(&mut self) -> *mut u8 {
    self.memory.as_mut_ptr::<u8>()
  }

  /// Writes `bytes` starting at the page's base. The page must still be
  /// writable (it is, until [`TrampolinePage::make_executable`] runs).
  pub unsafe fn write(&mut self, bytes: &[u8]) {
    self.write_at(0, bytes);
  }

  /// Writes `bytes` starting at `offset` from the page's base.
  pub unsafe fn write_at(&mut self, offset: usize, bytes: &[u8]) {
    std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.as_mut_ptr().add(offset), bytes.len());
  }

  /// Flips the page from read/write to read/execute. Once this returns,
  /// the page is final and must not be written to again.
  pub fn make_executable(&mut self) -> Result<()> {
    unsafe { region::protect(self.as_ptr(), TRAMPOLINE_SIZE, Protection::READ_EXECUTE) }.map_err(Error::ProtectFailed)
  }
}

/// Runs `body` with `len` bytes at `addr` temporarily made writable
/// (read/write/execute, since the target page must stay executable for
/// other threads), restoring the page's original protection afterwards —
/// on every exit path, including an error return from `body`.
pub unsafe fn with_writable_region<T>(addr: *const u8, len: usize, body: impl FnOnce() -> Result<T>) -> Result<T> {
  let handle = region::protect_with_handle(addr, len, Protection::READ_WRITE_EXECUTE).map_err(Error::ProtectFailed)?;
  let result = body();
  drop(handle);
  result
}
