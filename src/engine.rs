//! The hook registry: create/enable/disable and the enable/disable
//! protocols that install and remove the `E9` jump in a target's prolog.

use crate::alloc::{self, TrampolinePage};
use crate::decoder::Decoder;
use crate::error::{Error, Result};
use crate::thunk;
use lazy_static::lazy_static;
use std::sync::Mutex;

const JUMP_SIZE: usize = 5;
const REQUIRED_PROLOG: usize = JUMP_SIZE;
const STOLEN_CAPACITY: usize = 15;

/// A stable reference to one registered hook. Indexes into the shared
/// registry; does not carry a lifetime, since the registry itself is
/// process-global.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HookHandle(usize);

struct HookRecord {
  target_addr: *mut u8,
  detour_addr: *const u8,
  trampoline_slot: *mut *const u8,
  trampoline: Option<TrampolinePage>,
  stolen_bytes: [u8; STOLEN_CAPACITY],
  stolen_len: usize,
  enabled: bool,
}

// HookRecord is only ever touched while holding `REGISTRY`'s lock.
unsafe impl Send for HookRecord {}

lazy_static! {
  static ref REGISTRY: Mutex<Vec<HookRecord>> = Mutex::new(Vec::new());
}

/// Registers a hook for `target`, to be replaced by `detour` once
/// enabled. `out_slot` is written with the trampoline address on every
/// successful enable, and cleared on disable; it must outlive the hook.
///
/// Does not touch `target`'s memory. Returns `DuplicateTarget` if a hook
/// already exists for this address.
///
/// # Safety
/// `target` and `detour` must be valid, executable function addresses.
/// `out_slot` must be valid for writes for as long as the hook exists.
pub unsafe fn create_hook(target: *mut u8, detour: *const u8, out_slot: *mut *const u8) -> Result<HookHandle> {
  let mut registry = REGISTRY.lock().unwrap();

  if registry.iter().any(|record| record.target_addr == target) {
    return Err(Error::DuplicateTarget);
  }

  registry.push(HookRecord {
    target_addr: target,
    detour_addr: detour,
    trampoline_slot: out_slot,
    trampoline: None,
    stolen_bytes: [0; STOLEN_CAPACITY],
    stolen_len: 0,
    enabled: false,
  });

  Ok(HookHandle(registry.len() - 1))
}

/// Installs the interception for `handle`, per the enable protocol.
///
/// # Safety
/// The target function must not be executing concurrently on another
/// thread while this runs; see the crate-level concurrency notes.
pub unsafe fn enable_hook(handle: HookHandle) -> Result<()> {
  let mut registry = REGISTRY.lock().unwrap();
  let record = &mut registry[handle.0];
  enable_record(record)
}

unsafe fn enable_record(record: &mut HookRecord) -> Result<()> {
  if record.enabled {
    return Ok(());
  }

  let mut page = TrampolinePage::new()?;

  let (stolen_len, replicated) = match Decoder::decode_relocate(record.target_addr, REQUIRED_PROLOG, page.as_ptr())
  {
    Ok(result) => result,
    Err(error) => return Err(error),
  };

  if stolen_len < REQUIRED_PROLOG {
    return Err(Error::TargetTooSmall);
  }

  let replicated_len = replicated.len();
  page.write(&replicated);

  let tail_source = page.as_ptr().add(replicated_len) as usize;
  let tail_dest = record.target_addr.add(stolen_len) as usize;
  let tail_jump = thunk::jmp_rel32(tail_source, tail_dest);
  page.write_at(replicated_len, &tail_jump);

  page.make_executable()?;

  let stolen = std::slice::from_raw_parts(record.target_addr, stolen_len);
  record.stolen_bytes[..stolen_len].copy_from_slice(stolen);

  let head_jump = thunk::jmp_rel32(record.target_addr as usize, record.detour_addr as usize);
  let target = record.target_addr;
  alloc::with_writable_region(target, JUMP_SIZE, || {
    std::ptr::copy_nonoverlapping(head_jump.as_ptr(), target, JUMP_SIZE);
    Ok(())
  })?;

  *record.trampoline_slot = page.as_ptr();
  record.stolen_len = stolen_len;
  record.trampoline = Some(page);
  record.enabled = true;

  Ok(())
}

/// Restores the original prolog for `handle` and releases its trampoline.
///
/// # Safety
/// Same concurrency requirement as [`enable_hook`].
pub unsafe fn disable_hook(handle: HookHandle) -> Result<()> {
  let mut registry = REGISTRY.lock().unwrap();
  let record = &mut registry[handle.0];
  disable_record(record)
}

unsafe fn disable_record(record: &mut HookRecord) -> Result<()> {
  if !record.enabled {
    return Err(Error::NotEnabled);
  }

  let target = record.target_addr;
  let stolen_len = record.stolen_len;
  let backup = record.stolen_bytes;

  alloc::with_writable_region(target, stolen_len, || {
    std::ptr::copy_nonoverlapping(backup.as_ptr(), target, stolen_len);
    Ok(())
  })?;

  record.trampoline = None;
  *record.trampoline_slot = std::ptr::null();
  record.enabled = false;

  Ok(())
}

/// Enables every registered hook in creation order. Stops and returns the
/// first error; hooks enabled before the failure remain enabled.
///
/// # Safety
/// Same concurrency requirement as [`enable_hook`].
pub unsafe fn enable_all() -> Result<()> {
  let mut registry = REGISTRY.lock().unwrap();
  for record in registry.iter_mut() {
    enable_record(record)?;
  }
  Ok(())
}

/// Disables every registered hook in reverse creation order. Stops and
/// returns the first error; hooks disabled before the failure remain
/// disabled.
///
/// # Safety
/// Same concurrency requirement as [`enable_hook`].
pub unsafe fn disable_all() -> Result<()> {
  let mut registry = REGISTRY.lock().unwrap();
  for record in registry.iter_mut().rev() {
    disable_record(record)?;
  }
  Ok(())
}
