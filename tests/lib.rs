use matches::assert_matches;
use x86_inline_hook::{create_hook, disable_all, disable_hook, enable_all, enable_hook, Error};

type FnAdd = extern "C" fn(i32, i32) -> i32;

#[inline(never)]
extern "C" fn sub_detour(x: i32, y: i32) -> i32 {
  unsafe { std::ptr::read_volatile(&x as *const i32) - y }
}

mod round_trip {
  use super::*;

  #[test]
  fn call_through_trampoline_after_enable_and_after_disable() {
    #[inline(never)]
    extern "C" fn add(x: i32, y: i32) -> i32 {
      unsafe { std::ptr::read_volatile(&x as *const i32) + y }
    }

    unsafe {
      let mut trampoline: *const u8 = std::ptr::null();
      let handle = create_hook(add as *mut u8, sub_detour as *const u8, &mut trampoline).unwrap();

      assert_eq!(add(10, 5), 15);

      enable_hook(handle).unwrap();
      let original: FnAdd = std::mem::transmute(trampoline);

      assert_eq!(original(10, 5), 15);
      assert_eq!(add(10, 5), 5);

      disable_hook(handle).unwrap();

      assert_eq!(add(10, 5), 15);
    }
  }
}

mod registry_rules {
  use super::*;

  #[test]
  fn duplicate_target_is_rejected() {
    #[inline(never)]
    extern "C" fn add(x: i32, y: i32) -> i32 {
      unsafe { std::ptr::read_volatile(&x as *const i32) + y }
    }

    unsafe {
      let mut first_slot: *const u8 = std::ptr::null();
      let _first = create_hook(add as *mut u8, sub_detour as *const u8, &mut first_slot).unwrap();

      let mut second_slot: *const u8 = std::ptr::null();
      let err = create_hook(add as *mut u8, sub_detour as *const u8, &mut second_slot).unwrap_err();
      assert_matches!(err, Error::DuplicateTarget);
    }
  }

  #[test]
  fn disabling_a_disabled_hook_errors() {
    #[inline(never)]
    extern "C" fn add(x: i32, y: i32) -> i32 {
      unsafe { std::ptr::read_volatile(&x as *const i32) + y }
    }

    unsafe {
      let mut slot: *const u8 = std::ptr::null();
      let handle = create_hook(add as *mut u8, sub_detour as *const u8, &mut slot).unwrap();
      let err = disable_hook(handle).unwrap_err();
      assert_matches!(err, Error::NotEnabled);
    }
  }

  #[test]
  fn enabling_twice_is_idempotent() {
    #[inline(never)]
    extern "C" fn add(x: i32, y: i32) -> i32 {
      unsafe { std::ptr::read_volatile(&x as *const i32) + y }
    }

    unsafe {
      let mut slot: *const u8 = std::ptr::null();
      let handle = create_hook(add as *mut u8, sub_detour as *const u8, &mut slot).unwrap();

      enable_hook(handle).unwrap();
      let trampoline_after_first_enable = slot;
      enable_hook(handle).unwrap();

      assert_eq!(slot, trampoline_after_first_enable);
      disable_hook(handle).unwrap();
    }
  }
}

mod target_too_small {
  use super::*;
  use region::Protection;

  #[test]
  fn short_prolog_is_rejected_and_leaves_target_untouched() {
    unsafe {
      // A target whose only valid instruction is `ret`, backed by fresh
      // memory so the decoder has no well-defined bytes to read past it.
      let mut page = region::alloc(region::page::size(), Protection::READ_WRITE_EXECUTE).unwrap();
      let target = page.as_mut_ptr::<u8>();
      std::ptr::write(target, 0xC3u8);
      std::ptr::write(target.add(1), 0x00u8);

      let before = std::slice::from_raw_parts(target, 2).to_vec();

      let mut slot: *const u8 = std::ptr::null();
      let handle = create_hook(target, sub_detour as *const u8, &mut slot).unwrap();
      let err = enable_hook(handle).unwrap_err();
      assert_matches!(err, Error::TargetTooSmall);

      let after = std::slice::from_raw_parts(target, 2).to_vec();
      assert_eq!(before, after);
      assert!(slot.is_null());
    }
  }
}

mod bulk_operations {
  use super::*;

  #[test]
  fn enable_all_then_disable_all_restores_every_target() {
    #[inline(never)]
    extern "C" fn first(x: i32, y: i32) -> i32 {
      unsafe { std::ptr::read_volatile(&x as *const i32) + y }
    }
    #[inline(never)]
    extern "C" fn second(x: i32, y: i32) -> i32 {
      unsafe { std::ptr::read_volatile(&x as *const i32) * y }
    }

    unsafe {
      let mut slot_a: *const u8 = std::ptr::null();
      let mut slot_b: *const u8 = std::ptr::null();
      let handle_a = create_hook(first as *mut u8, sub_detour as *const u8, &mut slot_a).unwrap();
      let handle_b = create_hook(second as *mut u8, sub_detour as *const u8, &mut slot_b).unwrap();

      enable_all().unwrap();
      assert_eq!(first(10, 5), 5);
      assert_eq!(second(10, 5), 5);

      disable_all().unwrap();
      assert_eq!(first(10, 5), 15);
      assert_eq!(second(10, 5), 50);

      let _ = (handle_a, handle_b);
    }
  }
}
