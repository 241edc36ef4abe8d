//! The one-byte opcode map, and the addressing-method / operand-type tags
//! that drive instruction sizing (Intel SDM appendix A convention).

use lazy_static::lazy_static;

/// How an operand's location is specified.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum AddressingMethod {
  A,
  B,
  C,
  D,
  E,
  F,
  G,
  H,
  I,
  J,
  L,
  M,
  N,
  O,
  P,
  Q,
  R,
  S,
  U,
  V,
  W,
  X,
  Y,
}

/// An operand's size class.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum OperandType {
  A,
  B,
  C,
  D,
  Dq,
  P,
  Pd,
  Pi,
  Ps,
  Q,
  Qq,
  S,
  Sd,
  Ss,
  Si,
  V,
  W,
  X,
  Y,
  Z,
}

/// Addressing methods that consume a ModR/M byte.
pub const USES_MODRM: [AddressingMethod; 13] = [
  AddressingMethod::E,
  AddressingMethod::G,
  AddressingMethod::M,
  AddressingMethod::S,
  AddressingMethod::C,
  AddressingMethod::D,
  AddressingMethod::N,
  AddressingMethod::P,
  AddressingMethod::Q,
  AddressingMethod::R,
  AddressingMethod::U,
  AddressingMethod::V,
  AddressingMethod::W,
];

/// Addressing methods that consume an immediate (or immediate-shaped) field.
pub const USES_IMMEDIATE: [AddressingMethod; 4] = [
  AddressingMethod::A,
  AddressingMethod::I,
  AddressingMethod::J,
  AddressingMethod::O,
];

pub fn uses_modrm(method: AddressingMethod) -> bool {
  USES_MODRM.contains(&method)
}

pub fn uses_immediate(method: AddressingMethod) -> bool {
  USES_IMMEDIATE.contains(&method)
}

/// One operand slot of an opcode descriptor.
#[derive(Copy, Clone, Debug)]
pub struct Operand {
  pub method: AddressingMethod,
  pub kind: OperandType,
}

const fn op(method: AddressingMethod, kind: OperandType) -> Operand {
  Operand { method, kind }
}

/// Describes the operands of one primary opcode byte.
///
/// `None` means the opcode is outside this decoder's coverage (the
/// caller sees `Error::UnknownOpcode`) — most notably the entire `0F`
/// two-byte escape map, which this length-disassembler does not cover.
pub type OpcodeEntry = Option<&'static [Operand]>;

lazy_static! {
  pub static ref OPCODE_TABLE: [OpcodeEntry; 256] = build_table();
}

fn build_table() -> [OpcodeEntry; 256] {
  use AddressingMethod::*;
  use OperandType::*;

  let mut table: [OpcodeEntry; 256] = [None; 256];

  // No-operand instructions: a handful of one-byte instructions common in
  // compiler-emitted prologs that carry no ModR/M or immediate bytes.
  for &byte in &[0x90u8, 0xC3, 0xCC] {
    table[byte as usize] = Some(&[]);
  }

  // PUSH/POP r32 — register is coded in the opcode byte itself.
  for byte in 0x50u8..=0x5F {
    table[byte as usize] = Some(&[]);
  }

  // MOV r32, imm32 (B8+rd iv) — register coded in the opcode byte.
  for byte in 0xB8u8..=0xBF {
    table[byte as usize] = Some(&[op(I, V)]);
  }

  // ALU Eb/Ev, Gb/Gv and Gb/Gv, Eb/Ev forms: add/or/adc/sbb/and/sub/xor/cmp
  // all share this shape at the same column offsets in the one-byte map.
  for &base in &[0x00u8, 0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38] {
    table[base as usize] = Some(&[op(E, B), op(G, B)]);
    table[(base + 1) as usize] = Some(&[op(E, V), op(G, V)]);
    table[(base + 2) as usize] = Some(&[op(G, B), op(E, B)]);
    table[(base + 3) as usize] = Some(&[op(G, V), op(E, V)]);
    table[(base + 4) as usize] = Some(&[op(I, B)]); // AL, imm8
    table[(base + 5) as usize] = Some(&[op(I, Z)]); // eAX, imm32/16
  }

  // Group 1 (ADD/OR/ADC/SBB/AND/SUB/XOR/CMP) immediate forms.
  table[0x80] = Some(&[op(E, B), op(I, B)]);
  table[0x81] = Some(&[op(E, V), op(I, Z)]);
  table[0x83] = Some(&[op(E, V), op(I, B)]);

  // MOV Eb,Gb / Ev,Gv / Gb,Eb / Gv,Ev.
  table[0x88] = Some(&[op(E, B), op(G, B)]);
  table[0x89] = Some(&[op(E, V), op(G, V)]);
  table[0x8A] = Some(&[op(G, B), op(E, B)]);
  table[0x8B] = Some(&[op(G, V), op(E, V)]);

  // LEA Gv, M.
  table[0x8D] = Some(&[op(G, V), op(M, V)]);

  // MOV eAX,Ov / MOV Ov,eAX (direct memory-offset forms).
  table[0xA0] = Some(&[op(O, B)]);
  table[0xA1] = Some(&[op(O, V)]);
  table[0xA2] = Some(&[op(O, B)]);
  table[0xA3] = Some(&[op(O, V)]);

  // TEST Eb,Gb / Ev,Gv.
  table[0x84] = Some(&[op(E, B), op(G, B)]);
  table[0x85] = Some(&[op(E, V), op(G, V)]);

  // Group 11 (MOV) immediate forms.
  table[0xC6] = Some(&[op(E, B), op(I, B)]);
  table[0xC7] = Some(&[op(E, V), op(I, Z)]);

  // PUSH imm8 / imm32.
  table[0x6A] = Some(&[op(I, B)]);
  table[0x68] = Some(&[op(I, V)]);

  // Group 5 (INC/DEC/CALL/CALLF/JMP/JMPF/PUSH Ev) — length only depends
  // on the E operand; the /digit extension doesn't add bytes.
  table[0xFF] = Some(&[op(E, V)]);
  // Group 3 (TEST/NOT/NEG/MUL/IMUL/DIV/IDIV Eb / Ev). Only the /0-/1
  // (TEST) subcodes carry an immediate; the table can't express that
  // `/digit`-dependent presence, so the E operand is declared here and
  // the immediate is appended conditionally in `parse_instruction` once
  // the ModR/M `reg` field is known.
  table[0xF6] = Some(&[op(E, B)]);
  table[0xF7] = Some(&[op(E, V)]);
  // Group 2 (shift/rotate) Eb/Ev, 1 — no extra operand bytes.
  table[0xD0] = Some(&[op(E, B)]);
  table[0xD1] = Some(&[op(E, V)]);
  // Shift/rotate Eb/Ev, CL.
  table[0xD2] = Some(&[op(E, B)]);
  table[0xD3] = Some(&[op(E, V)]);
  // Shift/rotate Eb/Ev, Ib.
  table[0xC0] = Some(&[op(E, B), op(I, B)]);
  table[0xC1] = Some(&[op(E, V), op(I, B)]);

  // Near CALL/JMP rel32, short JMP rel8.
  table[0xE8] = Some(&[op(J, Z)]);
  table[0xE9] = Some(&[op(J, Z)]);
  table[0xEB] = Some(&[op(J, B)]);

  // Short conditional jumps Jcc rel8.
  for byte in 0x70u8..=0x7F {
    table[byte as usize] = Some(&[op(J, B)]);
  }

  // LOOP/LOOPE/LOOPNE/JCXZ rel8.
  for byte in 0xE0u8..=0xE3 {
    table[byte as usize] = Some(&[op(J, B)]);
  }

  // RET imm16 (far variant RETF handled the same for length purposes).
  table[0xC2] = Some(&[op(I, W)]);

  // The 0F two-byte escape map, VEX prefixes, and every other byte left
  // as `None` above are outside this decoder's coverage — see the
  // module-level doc comment.
  table
}
