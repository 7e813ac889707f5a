//! Integration tests for the regsim engine.
//!
//! Organized by instruction group, followed by whole-program scenarios and
//! property tests over the step contract.

use proptest::prelude::*;
use regsim_common::{Flag, Opcode, Register, Token};
use regsim_vm::{Machine, MachineConfig, RuntimeError, StepOutcome};

// ============================================================
// Helper functions
// ============================================================

/// A reset machine with `source` loaded and a 64-byte stack.
fn machine(source: &str) -> Machine {
    let mut machine = Machine::with_stack_capacity(64);
    machine.load(source).unwrap();
    machine
}

/// Step until `hlt` or the end of the stream. Returns the number of steps.
fn run(machine: &mut Machine) -> Result<usize, RuntimeError> {
    for steps in 1..=10_000 {
        match machine.step()? {
            StepOutcome::Halted | StepOutcome::Finished => return Ok(steps),
            StepOutcome::Executed(_) | StepOutcome::Skipped => {}
        }
    }
    panic!("program did not stop");
}

/// Load, run to completion, and return the machine.
fn run_source(source: &str) -> Machine {
    let mut m = machine(source);
    run(&mut m).unwrap();
    m
}

fn reg(m: &Machine, name: &str) -> u32 {
    m.register(name).unwrap()
}

// ============================================================
// Scenarios
// ============================================================

#[test]
fn add_two_registers() {
    let mut m = machine("mov eax,5\nmov ebx,3\nadd eax,ebx\n");
    for _ in 0..3 {
        m.step().unwrap();
    }
    assert_eq!(reg(&m, "eax"), 8);
}

#[test]
fn taken_je_skips_mov() {
    let m = run_source(
        "\
mov ecx,0
cmp ecx,0
je done
mov eax,1
done:
hlt
",
    );
    assert_eq!(reg(&m, "eax"), 0);
    assert!(m.has_flag(Flag::Zero));
}

#[test]
fn push_pop_order() {
    let m = run_source("push 10\npush 20\npop eax\npop ebx\n");
    assert_eq!(reg(&m, "eax"), 20);
    assert_eq!(reg(&m, "ebx"), 10);
    assert_eq!(reg(&m, "esp"), 64);
}

#[test]
fn bad_load_leaves_nothing_to_execute() {
    let mut m = Machine::default();
    let err = m.load("foo eax, 1").unwrap_err();
    assert_eq!(err.line(), 1);
    assert_eq!(m.step(), Ok(StepOutcome::Finished));
    assert!(m.is_finished());
}

#[test]
fn countdown_loop() {
    let m = run_source(
        "\
        mov ecx, 5
        mov eax, 0
again:
        add eax, ecx
        dec ecx
        cmp ecx, 0
        jne again
        hlt
",
    );
    assert_eq!(reg(&m, "eax"), 15);
    assert_eq!(reg(&m, "ecx"), 0);
}

#[test]
fn factorial_with_call_and_ret() {
    let m = run_source(
        "\
        mov ecx, 5
        call fact
        hlt
fact:
        mov eax, 1
fact_loop:
        mul ecx
        dec ecx
        cmp ecx, 1
        jg fact_loop
        ret
",
    );
    assert_eq!(reg(&m, "eax"), 120);
    assert_eq!(reg(&m, "esp"), 64);
    assert!(m.stack().is_empty());
}

#[test]
fn current_line_follows_eip() {
    let mut m = machine("; header\n\nmov eax, 1\n\nlbl:\n  hlt ; stop\n");
    assert_eq!(m.current_line(), Some(3));
    m.step().unwrap();
    assert_eq!(m.current_line(), Some(5));
    m.step().unwrap();
    assert_eq!(m.current_line(), Some(6));
}

#[test]
fn falling_off_the_end_finishes() {
    let mut m = machine("inc eax\n");
    assert_eq!(m.step(), Ok(StepOutcome::Executed(Opcode::Inc)));
    assert!(m.is_finished());
    assert_eq!(m.current_line(), None);
    assert_eq!(m.step(), Ok(StepOutcome::Finished));
    assert_eq!(reg(&m, "eax"), 1);
}

// ============================================================
// Data movement and arithmetic
// ============================================================

#[test]
fn mov_register_to_register() {
    let m = run_source("mov ebx, 77\nmov edx, ebx\n");
    assert_eq!(reg(&m, "edx"), 77);
}

#[test]
fn mov_wide_into_narrow_truncates() {
    let m = run_source("mov ebx, 4660\nmov al, bx\n");
    assert_eq!(reg(&m, "eax"), 0x34);
}

#[test]
fn mov_negative_immediate() {
    let m = run_source("mov eax, -1\nmov bx, -2\n");
    assert_eq!(reg(&m, "eax"), 0xFFFF_FFFF);
    assert_eq!(reg(&m, "ebx"), 0xFFFE);
}

#[test]
fn sub_sets_sign_and_carry() {
    let m = run_source("mov eax, 3\nsub eax, 5\n");
    assert_eq!(reg(&m, "eax"), 0xFFFF_FFFE);
    assert_eq!(m.flag("sf"), Ok(true));
    assert_eq!(m.flag("cf"), Ok(true));
    assert_eq!(m.flag("zf"), Ok(false));
    assert_eq!(m.flag("of"), Ok(false));
}

#[test]
fn add_in_byte_register_wraps_without_touching_parent() {
    let m = run_source("mov eax, 65535\nadd al, 1\n");
    assert_eq!(reg(&m, "eax"), 0xFF00);
    assert!(m.has_flag(Flag::Zero));
    assert!(m.has_flag(Flag::Carry));
}

#[test]
fn cmp_does_not_store() {
    let m = run_source("mov eax, 9\ncmp eax, 4\n");
    assert_eq!(reg(&m, "eax"), 9);
    assert!(m.has_flag(Flag::Overflow));
    assert!(!m.has_flag(Flag::Sign));
}

#[test]
fn flags_are_replaced_not_merged() {
    let m = run_source("mov eax, 1\ncmp eax, 1\ncmp eax, 0\n");
    assert!(!m.has_flag(Flag::Zero));
    assert_eq!(m.eflags() & Flag::Zero.mask(), 0);
}

#[test]
fn non_flag_instructions_leave_flags_alone() {
    let m = run_source(
        "mov eax, 1\ncmp eax, 1\nmov ebx, 0\ninc ebx\nxor eax, eax\nshl ebx, 2\npush 1\npop ecx\n",
    );
    assert_eq!(m.eflags(), Flag::Zero.mask() | Flag::Parity.mask());
}

#[test]
fn mul_uses_eax_accumulator() {
    let m = run_source("mov eax, 6\nmov bl, 7\nmul bl\n");
    assert_eq!(reg(&m, "eax"), 42);
    assert_eq!(reg(&m, "edx"), 0);
}

#[test]
fn mul_wraps_32_bits() {
    let m = run_source("mov eax, 65536\nmov ecx, 65536\nmul ecx\n");
    assert_eq!(reg(&m, "eax"), 0);
}

#[test]
fn div_sets_quotient_and_remainder() {
    let m = run_source("mov eax, 17\nmov ebx, 5\ndiv ebx\n");
    assert_eq!(reg(&m, "eax"), 3);
    assert_eq!(reg(&m, "edx"), 2);
}

#[test]
fn div_by_zero_mutates_nothing() {
    let mut m = machine("mov eax, 10\nmov edx, 4\nmov ebx, 0\ncmp eax, 3\ndiv ebx\n");
    for _ in 0..4 {
        m.step().unwrap();
    }
    let before: Vec<u32> = m.register_names().iter().map(|r| reg(&m, r)).collect();
    let eflags = m.eflags();
    assert_eq!(m.step(), Err(RuntimeError::DivisionByZero { line: 5 }));
    let after: Vec<u32> = m.register_names().iter().map(|r| reg(&m, r)).collect();
    assert_eq!(before, after);
    assert_eq!(m.eflags(), eflags);
}

#[test]
fn inc_dec_wrap_within_width() {
    let m = run_source("mov ebx, 511\ninc bl\nmov ecx, 65536\ndec cx\n");
    assert_eq!(reg(&m, "ebx"), 0x100);
    assert_eq!(reg(&m, "ecx"), 0x1_FFFF);
}

// ============================================================
// Bitwise
// ============================================================

#[test]
fn and_or_xor() {
    let m = run_source("mov eax, 12\nand eax, 10\nmov ebx, 12\nor ebx, 3\nmov ecx, 15\nxor ecx, 5\n");
    assert_eq!(reg(&m, "eax"), 8);
    assert_eq!(reg(&m, "ebx"), 15);
    assert_eq!(reg(&m, "ecx"), 10);
}

#[test]
fn not_respects_width() {
    let m = run_source("mov edx, 0\nnot dh\n");
    assert_eq!(reg(&m, "edx"), 0xFF00);
}

#[test]
fn shifts_by_register_and_immediate() {
    let m = run_source("mov eax, 1\nmov cl, 4\nshl eax, cl\nmov ebx, 256\nshr ebx, 3\n");
    assert_eq!(reg(&m, "eax"), 16);
    assert_eq!(reg(&m, "ebx"), 32);
}

#[test]
fn shl_drops_bits_past_width() {
    let m = run_source("mov ax, 32768\nshl ax, 1\n");
    assert_eq!(reg(&m, "eax"), 0);
}

// ============================================================
// Stack
// ============================================================

#[test]
fn push_decrements_esp() {
    let mut m = machine("push 1\npush eax\n");
    m.step().unwrap();
    assert_eq!(reg(&m, "esp"), 60);
    m.step().unwrap();
    assert_eq!(reg(&m, "esp"), 56);
    assert_eq!(m.stack(), &[1, 0]);
    assert_eq!(reg(&m, "ebp"), 64);
}

#[test]
fn push_past_capacity_overflows() {
    let mut m = Machine::with_stack_capacity(8);
    m.load("push 1\npush 2\npush 3\n").unwrap();
    m.step().unwrap();
    m.step().unwrap();
    assert_eq!(reg(&m, "esp"), 0);
    assert_eq!(
        m.step(),
        Err(RuntimeError::StackOverflow {
            line: 3,
            capacity: 8
        })
    );
    assert_eq!(m.stack(), &[1, 2]);
    assert_eq!(reg(&m, "esp"), 0);
    assert_eq!(m.eip(), 4);
}

#[test]
fn zero_capacity_cannot_push() {
    let mut m = Machine::with_stack_capacity(0);
    m.load("push 1\n").unwrap();
    assert!(matches!(m.step(), Err(RuntimeError::StackOverflow { .. })));
}

#[test]
fn pop_empty_underflows() {
    let mut m = machine("pop eax\n");
    assert_eq!(m.step(), Err(RuntimeError::StackUnderflow { line: 1 }));
    assert_eq!(reg(&m, "esp"), 64);
    assert_eq!(m.eip(), 0);
}

#[test]
fn ret_empty_underflows() {
    let mut m = machine("ret\n");
    assert_eq!(m.step(), Err(RuntimeError::StackUnderflow { line: 1 }));
}

#[test]
fn call_pushes_return_index() {
    let mut m = machine("call f\nhlt\nf:\nret\n");
    m.step().unwrap();
    assert_eq!(m.stack(), &[2]);
    assert_eq!(m.eip(), 3);
    assert_eq!(reg(&m, "esp"), 60);
    assert_eq!(m.step(), Ok(StepOutcome::Skipped));
    assert_eq!(m.step(), Ok(StepOutcome::Executed(Opcode::Ret)));
    assert_eq!(m.eip(), 2);
    assert_eq!(reg(&m, "esp"), 64);
    assert_eq!(m.step(), Ok(StepOutcome::Halted));
}

#[test]
fn call_overflow_leaves_state() {
    let mut m = Machine::with_stack_capacity(0);
    m.load("call f\nf:\nhlt\n").unwrap();
    assert!(matches!(m.step(), Err(RuntimeError::StackOverflow { .. })));
    assert_eq!(m.eip(), 0);
    assert!(m.stack().is_empty());
}

// ============================================================
// Control flow
// ============================================================

fn branch_taken(setup: &str, jump: &str) -> bool {
    let source = format!("{setup}\n{jump} yes\nmov eax, 2\nhlt\nyes:\nmov eax, 1\nhlt\n");
    let m = run_source(&source);
    reg(&m, "eax") == 1
}

#[test]
fn conditional_jumps() {
    let eq = "mov ebx, 4\ncmp ebx, 4";
    let gt = "mov ebx, 5\ncmp ebx, 4";
    let lt = "mov ebx, 3\ncmp ebx, 4";

    for jump in ["je", "jz"] {
        assert!(branch_taken(eq, jump));
        assert!(!branch_taken(gt, jump));
    }
    for jump in ["jne", "jnz"] {
        assert!(!branch_taken(eq, jump));
        assert!(branch_taken(lt, jump));
    }
    for jump in ["jg", "jns"] {
        assert!(branch_taken(gt, jump));
        assert!(!branch_taken(eq, jump));
        assert!(!branch_taken(lt, jump));
    }
    for jump in ["jl", "js"] {
        assert!(branch_taken(lt, jump));
        assert!(!branch_taken(eq, jump));
        assert!(!branch_taken(gt, jump));
    }
}

#[test]
fn jump_before_any_flags() {
    // eflags starts at 0, so jne is taken and je is not.
    assert!(branch_taken("mov ebx, 0", "jne"));
    assert!(!branch_taken("mov ebx, 0", "je"));
}

#[test]
fn backward_jump_reaches_first_declaration() {
    let mut m = machine("top:\ninc eax\ncmp eax, 3\njl top\ntop:\nhlt\n");
    run(&mut m).unwrap();
    assert_eq!(reg(&m, "eax"), 3);
}

#[test]
fn label_not_found_names_the_label() {
    let mut m = machine("mov eax, 1\njmp Nowhere\n");
    m.step().unwrap();
    assert_eq!(
        m.step(),
        Err(RuntimeError::LabelNotFound {
            line: 2,
            label: "Nowhere".to_string()
        })
    );
}

#[test]
fn hlt_stalls_eip() {
    let mut m = machine("inc eax\nhlt\ninc eax\n");
    m.step().unwrap();
    assert_eq!(m.step(), Ok(StepOutcome::Halted));
    let eip = m.eip();
    assert_eq!(m.step(), Ok(StepOutcome::Halted));
    assert_eq!(m.eip(), eip);
    assert_eq!(reg(&m, "eax"), 1);
}

// ============================================================
// Reset, reload and queries
// ============================================================

#[test]
fn reset_restores_initial_state() {
    let mut m = machine("mov eax, 9\npush eax\ncmp eax, 1\nmov esi, 3\n");
    run(&mut m).unwrap();
    m.reset();
    assert_eq!(m.eip(), 0);
    assert_eq!(m.eflags(), 0);
    assert_eq!(reg(&m, "esp"), 64);
    assert_eq!(reg(&m, "ebp"), 64);
    assert_eq!(reg(&m, "eax"), 0);
    assert_eq!(reg(&m, "esi"), 0);
    assert!(m.stack().is_empty());
    // The program survives and runs again.
    run(&mut m).unwrap();
    assert_eq!(reg(&m, "eax"), 9);
}

#[test]
fn load_replaces_program_wholesale() {
    let mut m = machine("mov eax, 1\n");
    m.load("mov ebx, 2\nhlt\n").unwrap();
    m.reset();
    run(&mut m).unwrap();
    assert_eq!(reg(&m, "eax"), 0);
    assert_eq!(reg(&m, "ebx"), 2);
}

#[test]
fn load_is_idempotent() {
    let mut m = Machine::default();
    m.load("a:\njmp a\n").unwrap();
    let first = m.program().cloned();
    m.load("a:\njmp a\n").unwrap();
    assert_eq!(m.program().cloned(), first);
}

#[test]
fn config_capacity_sets_esp() {
    let m = Machine::new(MachineConfig::with_stack_capacity(4096));
    assert_eq!(reg(&m, "esp"), 4096);
    assert_eq!(m.config().stack_capacity, 4096);
}

#[test]
fn eip_is_readable_by_name() {
    let mut m = machine("mov eax, 1\nhlt\n");
    m.step().unwrap();
    assert_eq!(reg(&m, "eip"), 3);
    assert_eq!(m.get(Register::Eip), 3);
}

// ============================================================
// Properties
// ============================================================

/// A straight-line or forward-branching fragment. Stack fragments are
/// balanced, and `call helper` returns through the routine after `end:`.
fn arb_line() -> impl Strategy<Value = String> {
    let regs = prop::sample::select(vec![
        "eax", "ebx", "ecx", "edx", "esi", "edi", "ax", "bx", "cl", "dh", "al", "bh",
    ]);
    let pair = prop::sample::select(vec![
        "mov", "add", "sub", "cmp", "and", "or", "xor", "shl", "shr",
    ]);
    let single = prop::sample::select(vec!["inc", "dec", "not", "mul", "push"]);
    let jump = prop::sample::select(vec!["jmp", "je", "jne", "jg", "jl", "jz", "js"]);
    prop_oneof![
        (pair, regs.clone(), any::<u16>()).prop_map(|(op, r, v)| format!("{op} {r}, {v}")),
        (single, regs.clone()).prop_map(|(op, r)| format!("{op} {r}")),
        jump.prop_map(|op| format!("{op} end")),
        (regs.clone(), regs.clone()).prop_map(|(src, dst)| format!("push {src}\npop {dst}")),
        (1u32..=u16::MAX as u32).prop_map(|v| format!("div {v}")),
        Just("call helper".to_string()),
        Just("mark:".to_string()),
    ]
}

fn arb_program() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_line(), 0..30).prop_map(|lines| {
        format!(
            "{}\nend:\nhlt\nhelper:\ninc esi\nret\n",
            lines.join("\n")
        )
    })
}

proptest! {
    /// `eip` only ever rests on a label, a mnemonic, or past the end.
    #[test]
    fn eip_never_lands_mid_instruction(source in arb_program()) {
        let mut m = Machine::with_stack_capacity(1 << 16);
        m.load(&source).unwrap();
        for _ in 0..200 {
            let outcome = m.step().unwrap();
            match m.program().and_then(|p| p.get(m.eip())) {
                None | Some(Token::Label(_)) | Some(Token::Op(_)) => {}
                Some(other) => prop_assert!(false, "eip {} on operand {other}", m.eip()),
            }
            if matches!(outcome, StepOutcome::Halted | StepOutcome::Finished) {
                break;
            }
        }
    }

    /// Writing a low byte never changes bits 31..8 of its parent.
    #[test]
    fn low_byte_write_preserves_upper_bits(initial in any::<u32>(), byte in 0u32..256) {
        let m = run_source(&format!("mov ebx, {initial}\nmov bl, {byte}\n"));
        let ebx = reg(&m, "ebx");
        prop_assert_eq!(ebx & 0xFFFF_FF00, initial & 0xFFFF_FF00);
        prop_assert_eq!(ebx & 0xFF, byte);
    }

    /// Writing a high byte never changes bits outside 15..8.
    #[test]
    fn high_byte_write_preserves_other_bits(initial in any::<u32>(), byte in 0u32..256) {
        let m = run_source(&format!("mov ecx, {initial}\nmov ch, {byte}\n"));
        let ecx = reg(&m, "ecx");
        prop_assert_eq!(ecx & 0xFFFF_00FF, initial & 0xFFFF_00FF);
        prop_assert_eq!(reg(&m, "ch"), byte);
    }

    /// push then pop returns the value and restores esp.
    #[test]
    fn push_pop_roundtrip(value in any::<u32>(), pushed in 0usize..8) {
        let mut m = machine(&format!("{}push {value}\npop edx\n", "push 0\n".repeat(pushed)));
        for _ in 0..pushed {
            m.step().unwrap();
        }
        let esp = reg(&m, "esp");
        m.step().unwrap();
        m.step().unwrap();
        prop_assert_eq!(reg(&m, "edx"), value);
        prop_assert_eq!(reg(&m, "esp"), esp);
    }

    /// reset yields the same initial state whatever ran before.
    #[test]
    fn reset_is_total(source in arb_program(), capacity in 0u32..512) {
        let mut m = Machine::with_stack_capacity(capacity);
        m.load(&source).unwrap();
        for _ in 0..50 {
            if m.step().is_err() {
                break;
            }
        }
        m.reset();
        prop_assert_eq!(m.eip(), 0);
        prop_assert_eq!(m.eflags(), 0);
        prop_assert_eq!(reg(&m, "esp"), capacity);
        prop_assert_eq!(reg(&m, "ebp"), capacity);
        prop_assert!(m.stack().is_empty());
        for name in ["eax", "ebx", "ecx", "edx", "esi", "edi"] {
            prop_assert_eq!(reg(&m, name), 0);
        }
    }
}
