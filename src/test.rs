//! End-to-end scenarios spanning [`Memory`], [`Instruction`] and [`Processor`]
//! together, as opposed to the single-unit tests living alongside each of
//! those modules.

use super::*;

fn place(mem: &mut Memory, addr: Address, instr: Instruction) {
    mem.set(addr, instr.encode());
}

/// `CP 100 42` followed by a `BZJ` landing on itself: the canonical
/// "halt" idiom a lowered program ends with.
#[test]
fn identity_program_runs_to_self_loop() {
    let mut mem = Memory::new();
    place(&mut mem, 0, Instruction::new(Opcode::CP, true, 100, 42));
    mem.set(2, 1);
    mem.set(constants::ZERO_ADDR, 0);
    place(
        &mut mem,
        1,
        Instruction::new(Opcode::BZJ, false, 2, constants::ZERO_ADDR),
    );

    let mut proc = Processor::new();
    assert_eq!(proc.run_until_pause(&mut mem), Step::Paused(PauseReason::SelfLoop));
    assert_eq!(mem.peek(100), 42);
    assert_eq!(proc.pc(), 1);
}

/// A negated literal, lowered the way pass 8 of the lowering pipeline would:
/// stash the literal, then `MUL` by the constant -1 cell.
#[test]
fn negative_literal_lowering_via_mul() {
    let mut mem = Memory::new();
    mem.set(constants::NEG_ONE_ADDR, 0xFFFFFFFF);
    place(
        &mut mem,
        0,
        Instruction::new(Opcode::CP, true, constants::NEGATE_SCRATCH_ADDR, 7),
    );
    place(
        &mut mem,
        1,
        Instruction::new(
            Opcode::MUL,
            false,
            constants::NEGATE_SCRATCH_ADDR,
            constants::NEG_ONE_ADDR,
        ),
    );

    let mut proc = Processor::new();
    assert_eq!(proc.step(&mut mem), Step::Continue);
    assert_eq!(proc.step(&mut mem), Step::Continue);
    assert_eq!(mem.peek(constants::NEGATE_SCRATCH_ADDR), (-7i32) as Word);
}

/// `bl` ("branch if less") lowers to a `LT` feeding a `BZJ` gated on the
/// complement scratch cell, per pass 9 of the lowering pipeline.
#[test]
fn less_than_branch_lowering() {
    let mut mem = Memory::new();
    mem.set(10, 3);
    mem.set(20, 5);
    mem.set(constants::ZERO_ADDR, 0);

    // CC_LE = (mem[10] < mem[20])
    place(
        &mut mem,
        0,
        Instruction::new(Opcode::CP, false, constants::CC_LE_ADDR, 10),
    );
    place(
        &mut mem,
        1,
        Instruction::new(Opcode::LT, false, constants::CC_LE_ADDR, 20),
    );
    // jump to address 4 when CC_LE is zero (i.e. branch not taken)
    mem.set(5, 4);
    place(
        &mut mem,
        2,
        Instruction::new(Opcode::BZJ, false, 5, constants::CC_LE_ADDR),
    );
    place(&mut mem, 4, Instruction::new(Opcode::CP, true, 200, 1));

    let mut proc = Processor::new();
    assert_eq!(proc.step(&mut mem), Step::Continue); // CP
    assert_eq!(proc.step(&mut mem), Step::Continue); // LT -> CC_LE = 1
    assert_eq!(mem.peek(constants::CC_LE_ADDR), 1);
    // CC_LE is nonzero, so the BZJ at address 2 does not jump.
    assert_eq!(proc.step(&mut mem), Step::Continue);
    assert_eq!(proc.pc(), 3);
}

/// `CPI` with both forms chained: first dereference a pointer cell into a
/// scratch address, then dereference that into a destination.
#[test]
fn cpi_chained_indirection() {
    let mut mem = Memory::new();
    mem.set(50, 60);
    mem.set(60, 777);
    place(&mut mem, 0, Instruction::new(Opcode::CPI, false, 5, 50));

    let mut proc = Processor::new();
    assert_eq!(proc.step(&mut mem), Step::Continue);
    assert_eq!(mem.peek(5), 777);
}

/// A read of a never-written cell pauses with a fault and rewinds the
/// program counter so the driver can re-attempt after filling it in.
#[test]
fn uninitialized_read_is_recoverable() {
    let mut mem = Memory::new();
    place(&mut mem, 0, Instruction::new(Opcode::ADD, false, 9, 11));

    let mut proc = Processor::new();
    assert_eq!(
        proc.step(&mut mem),
        Step::Paused(PauseReason::UninitializedRead(11))
    );
    assert_eq!(proc.pc(), 0);

    mem.set(9, 1);
    mem.set(11, 2);
    proc.resume();
    assert_eq!(proc.step(&mut mem), Step::Continue);
    assert_eq!(mem.peek(9), 3);
}
