//! An in-process inline hooking library for 32-bit x86 code.
//!
//! Given the address of an existing function ("target") and a
//! replacement ("detour"), this library rewrites the first bytes of the
//! target so control is diverted to the detour, while exposing a
//! separately allocated **trampoline** through which the detour can
//! still call the original behavior.
//!
//! ## Procedure
//!
//! To illustrate a hook on an x86 target:
//!
//! ```c
//! 0 int return_five() {
//! 1     return 5;
//! 00400020 [b8 05 00 00 00] mov eax, 5
//! 00400025 [c3]             ret
//! 2 }
//! ```
//!
//! Enabling a hook on `return_five` replaces its first five bytes with a
//! relative jump to the detour, after relocating those same five (or
//! more) bytes into a trampoline:
//!
//! ```c
//! 0 int return_five() {
//! 1     return detour_function();
//! 00400020 [e9 16 00 00 00] jmp 1b <detour_function>
//! 00400025 [c3]             ret
//! 2 }
//! ```
//!
//! The trampoline runs the relocated `mov eax, 5` and then jumps back
//! into `return_five` at the instruction following the stolen bytes, so
//! a detour that calls through the trampoline slot observes the
//! original behavior.
//!
//! ## Scope
//!
//! This covers 32-bit (`E9`-relative) hooking only: no RIP-relative
//! operands, no relay for out-of-range detours, no thread suspension.
//! Installing a hook while other threads may be executing inside the
//! target's first five bytes is the caller's responsibility; see the
//! module-level safety notes on [`enable_hook`].

#[macro_use]
extern crate lazy_static;
extern crate region;

pub use crate::engine::{create_hook, disable_all, disable_hook, enable_all, enable_hook, HookHandle};
pub use crate::error::{Error, Result};

mod alloc;
mod decoder;
mod engine;
mod error;
mod thunk;
