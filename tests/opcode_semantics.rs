use chip8_core::chip8_engine::chip8_engine::{EngineConfig, Interpreter};
use chip8_core::device::device::{DisplayDevice, Headless};
use chip8_core::errors::errors::ExecError;

fn new_headless_interp() -> Interpreter<Headless> {
    Interpreter::new(
        Headless::new(),
        EngineConfig {
            seed: Some(0xC8),
            ..EngineConfig::default()
        },
    )
}

fn write_opcode(interp: &mut Interpreter<Headless>, addr: u16, opcode: u16) {
    interp.state.write_bytes(addr, &opcode.to_be_bytes());
}

fn exec_opcode(interp: &mut Interpreter<Headless>, opcode: u16) {
    let pc = interp.state.pc;
    write_opcode(interp, pc, opcode);
    interp.step().unwrap();
}

fn try_exec_opcode(interp: &mut Interpreter<Headless>, opcode: u16) -> Result<(), ExecError> {
    let pc = interp.state.pc;
    write_opcode(interp, pc, opcode);
    interp.step()
}

#[test]
fn opcode_00e0_clears_screen() {
    let mut interp = new_headless_interp();
    interp.io.draw_sprite(0, 0, &[0xFF, 0xFF]);
    assert_eq!(interp.io.screen.lit_count(), 16);

    exec_opcode(&mut interp, 0x00E0);
    assert_eq!(interp.io.screen.lit_count(), 0);
    assert_eq!(interp.state.pc, 0x202);
}

#[test]
fn opcode_2nnn_pushes_call_address() {
    let mut interp = new_headless_interp();
    exec_opcode(&mut interp, 0x2300);
    assert_eq!(interp.state.pc, 0x300);
    assert_eq!(interp.state.sp, 1);
    assert_eq!(interp.state.stack[1], 0x200);
}

#[test]
fn opcode_00ee_returns_past_the_call() {
    let mut interp = new_headless_interp();
    exec_opcode(&mut interp, 0x2300);
    exec_opcode(&mut interp, 0x00EE);
    assert_eq!(interp.state.pc, 0x202);
    assert_eq!(interp.state.sp, 0);
}

#[test]
fn opcode_0nnn_is_unrecognized() {
    let mut interp = new_headless_interp();
    let err = try_exec_opcode(&mut interp, 0x0123).unwrap_err();
    assert_eq!(
        err,
        ExecError::UnrecognizedOpcode {
            pc: 0x200,
            opcode: 0x0123
        }
    );
    assert_eq!(interp.state.pc, 0x200);
    assert_eq!(interp.cycles(), 0);
}

#[test]
fn non_template_opcodes_are_unrecognized() {
    for opcode in [0x5121u16, 0x8008, 0x800F, 0x9AB1, 0xE000, 0xE19F, 0xF0FF, 0xF066] {
        let mut interp = new_headless_interp();
        assert!(
            matches!(
                try_exec_opcode(&mut interp, opcode),
                Err(ExecError::UnrecognizedOpcode { .. })
            ),
            "{opcode:04X} should not decode"
        );
    }
}

#[test]
fn opcode_1nnn_jumps() {
    let mut interp = new_headless_interp();
    exec_opcode(&mut interp, 0x1234);
    assert_eq!(interp.state.pc, 0x234);
}

#[test]
fn opcode_3xkk_skips_on_equal() {
    let mut interp = new_headless_interp();
    interp.state.v[1] = 0x42;
    exec_opcode(&mut interp, 0x3142);
    assert_eq!(interp.state.pc, 0x204);
}

#[test]
fn opcode_3xkk_no_skip_on_inequal() {
    let mut interp = new_headless_interp();
    interp.state.v[1] = 0x41;
    exec_opcode(&mut interp, 0x3142);
    assert_eq!(interp.state.pc, 0x202);
}

#[test]
fn opcode_4xkk_skips_on_inequal() {
    let mut interp = new_headless_interp();
    interp.state.v[1] = 0x41;
    exec_opcode(&mut interp, 0x4142);
    assert_eq!(interp.state.pc, 0x204);
}

#[test]
fn opcode_5xy0_skips_on_equal() {
    let mut interp = new_headless_interp();
    interp.state.v[1] = 0x33;
    interp.state.v[2] = 0x33;
    exec_opcode(&mut interp, 0x5120);
    assert_eq!(interp.state.pc, 0x204);

    interp.state.v[2] = 0x34;
    exec_opcode(&mut interp, 0x5120);
    assert_eq!(interp.state.pc, 0x206);
}

#[test]
fn opcode_6xkk_loads_register() {
    let mut interp = new_headless_interp();
    exec_opcode(&mut interp, 0x6A7F);
    assert_eq!(interp.state.v[0xA], 0x7F);
    assert_eq!(interp.state.pc, 0x202);
}

#[test]
fn opcode_7xkk_adds_immediate_with_wrap() {
    let mut interp = new_headless_interp();
    interp.state.v[2] = 0xFF;
    interp.state.v[0xF] = 0x55;
    exec_opcode(&mut interp, 0x7202);
    assert_eq!(interp.state.v[2], 0x01);
    // no carry flag on the immediate add
    assert_eq!(interp.state.v[0xF], 0x55);
}

#[test]
fn opcode_8xy0_to_8xy3_logic() {
    let mut interp = new_headless_interp();
    interp.state.v[1] = 0b1100;
    interp.state.v[2] = 0b1010;

    exec_opcode(&mut interp, 0x8121);
    assert_eq!(interp.state.v[1], 0b1110);

    interp.state.v[1] = 0b1100;
    exec_opcode(&mut interp, 0x8122);
    assert_eq!(interp.state.v[1], 0b1000);

    interp.state.v[1] = 0b1100;
    exec_opcode(&mut interp, 0x8123);
    assert_eq!(interp.state.v[1], 0b0110);

    exec_opcode(&mut interp, 0x8120);
    assert_eq!(interp.state.v[1], 0b1010);
}

#[test]
fn opcode_8xy4_sets_carry() {
    let mut interp = new_headless_interp();
    interp.state.v[1] = 0xF0;
    interp.state.v[2] = 0x20;
    exec_opcode(&mut interp, 0x8124);
    assert_eq!(interp.state.v[1], 0x10);
    assert_eq!(interp.state.v[0xF], 1);

    interp.state.v[1] = 0x10;
    exec_opcode(&mut interp, 0x8124);
    assert_eq!(interp.state.v[1], 0x30);
    assert_eq!(interp.state.v[0xF], 0);
}

#[test]
fn opcode_8xy5_sets_not_borrow_flag() {
    let mut interp = new_headless_interp();
    interp.state.v[1] = 5;
    interp.state.v[2] = 5;
    exec_opcode(&mut interp, 0x8125);
    assert_eq!(interp.state.v[1], 0);
    assert_eq!(interp.state.v[0xF], 1);

    interp.state.v[1] = 3;
    exec_opcode(&mut interp, 0x8125);
    assert_eq!(interp.state.v[1], 0xFE);
    assert_eq!(interp.state.v[0xF], 0);
}

#[test]
fn opcode_8xy7_subtracts_vx_from_vy() {
    let mut interp = new_headless_interp();
    interp.state.v[1] = 3;
    interp.state.v[2] = 5;
    exec_opcode(&mut interp, 0x8127);
    assert_eq!(interp.state.v[1], 2);
    assert_eq!(interp.state.v[0xF], 1);

    interp.state.v[1] = 5;
    interp.state.v[2] = 3;
    exec_opcode(&mut interp, 0x8127);
    assert_eq!(interp.state.v[1], 0xFE);
    assert_eq!(interp.state.v[0xF], 0);
}

#[test]
fn opcode_8xy6_shifts_vx_right() {
    let mut interp = new_headless_interp();
    interp.state.v[3] = 0b0000_0101;
    interp.state.v[4] = 0xFF;
    exec_opcode(&mut interp, 0x8346);
    assert_eq!(interp.state.v[3], 0b0000_0010);
    assert_eq!(interp.state.v[0xF], 1);
    // Vy is encoded but not read
    assert_eq!(interp.state.v[4], 0xFF);
}

#[test]
fn opcode_8xye_shifts_vx_left() {
    let mut interp = new_headless_interp();
    interp.state.v[3] = 0b1000_0001;
    exec_opcode(&mut interp, 0x830E);
    assert_eq!(interp.state.v[3], 0b0000_0010);
    assert_eq!(interp.state.v[0xF], 1);

    exec_opcode(&mut interp, 0x830E);
    assert_eq!(interp.state.v[3], 0b0000_0100);
    assert_eq!(interp.state.v[0xF], 0);
}

#[test]
fn alu_flags_hold_for_every_operand_pair() {
    let mut interp = new_headless_interp();
    write_opcode(&mut interp, 0x200, 0x8124);
    write_opcode(&mut interp, 0x202, 0x8345);
    write_opcode(&mut interp, 0x204, 0x8567);

    for a in 0..=255u8 {
        for b in 0..=255u8 {
            interp.state.set_pc(0x200);
            interp.state.v[1..=6].copy_from_slice(&[a, b, a, b, a, b]);

            interp.step().unwrap();
            let add_flag = interp.state.v[0xF];
            interp.step().unwrap();
            let sub_flag = interp.state.v[0xF];
            interp.step().unwrap();
            let subn_flag = interp.state.v[0xF];

            assert_eq!(interp.state.v[1], a.wrapping_add(b));
            assert_eq!(add_flag, (a as u16 + b as u16 > 0xFF) as u8);
            assert_eq!(interp.state.v[3], a.wrapping_sub(b));
            assert_eq!(sub_flag, (a >= b) as u8);
            assert_eq!(interp.state.v[5], b.wrapping_sub(a));
            assert_eq!(subn_flag, (b >= a) as u8);
        }
    }
}

#[test]
fn flag_wins_when_vf_is_the_destination() {
    let mut interp = new_headless_interp();
    interp.state.v[0xF] = 0xF0;
    interp.state.v[1] = 0x20;
    exec_opcode(&mut interp, 0x8F14);
    assert_eq!(interp.state.v[0xF], 1);
}

#[test]
fn opcode_9xy0_skips_on_inequal() {
    let mut interp = new_headless_interp();
    interp.state.v[1] = 1;
    interp.state.v[2] = 2;
    exec_opcode(&mut interp, 0x9120);
    assert_eq!(interp.state.pc, 0x204);

    interp.state.v[2] = 1;
    exec_opcode(&mut interp, 0x9120);
    assert_eq!(interp.state.pc, 0x206);
}

#[test]
fn opcode_annn_sets_i() {
    let mut interp = new_headless_interp();
    exec_opcode(&mut interp, 0xA456);
    assert_eq!(interp.state.i, 0x456);
}

#[test]
fn opcode_bnnn_adds_v0_to_jump() {
    let mut interp = new_headless_interp();
    interp.state.v[0] = 0x05;
    exec_opcode(&mut interp, 0xB300);
    assert_eq!(interp.state.pc, 0x305);
}

#[test]
fn opcode_bnnn_wraps_into_address_space() {
    let mut interp = new_headless_interp();
    interp.state.v[0] = 0xFF;
    exec_opcode(&mut interp, 0xBFFF);
    assert_eq!(interp.state.pc, 0x0FE);
}

#[test]
fn opcode_cxkk_masks_random() {
    let mut interp = new_headless_interp();
    for _ in 0..32 {
        exec_opcode(&mut interp, 0xC10F);
        assert_eq!(interp.state.v[1] & 0xF0, 0);
    }
    exec_opcode(&mut interp, 0xC100);
    assert_eq!(interp.state.v[1], 0);
}

#[test]
fn opcode_cxkk_is_reproducible_with_a_seed() {
    let mut first = new_headless_interp();
    let mut second = new_headless_interp();
    for _ in 0..16 {
        exec_opcode(&mut first, 0xC2FF);
        exec_opcode(&mut second, 0xC2FF);
        assert_eq!(first.state.v[2], second.state.v[2]);
    }
}

#[test]
fn opcode_dxyn_draws_and_collides() {
    let mut interp = new_headless_interp();
    interp.state.i = 0x300;
    interp.state.write_bytes(0x300, &[0xF0, 0x90]);
    interp.state.v[1] = 10;
    interp.state.v[2] = 5;

    exec_opcode(&mut interp, 0xD122);
    assert_eq!(interp.state.v[0xF], 0);
    assert_eq!(interp.io.screen.lit_count(), 6);
    assert!(interp.io.screen.pixel(10, 5));
    assert!(interp.io.screen.pixel(13, 6));
    assert!(!interp.io.screen.pixel(11, 6));

    exec_opcode(&mut interp, 0xD122);
    assert_eq!(interp.state.v[0xF], 1);
    assert_eq!(interp.io.screen.lit_count(), 0);
}

#[test]
fn opcode_ex9e_skips_if_key_pressed() {
    let mut interp = new_headless_interp();
    interp.state.v[2] = 0xA;
    interp.io.keys.push_key(0xA);
    exec_opcode(&mut interp, 0xE29E);
    assert_eq!(interp.state.pc, 0x204);

    // nothing pressed
    exec_opcode(&mut interp, 0xE29E);
    assert_eq!(interp.state.pc, 0x206);
}

#[test]
fn opcode_exa1_skips_if_key_not_pressed() {
    let mut interp = new_headless_interp();
    interp.state.v[2] = 0xA;
    exec_opcode(&mut interp, 0xE2A1);
    assert_eq!(interp.state.pc, 0x204);

    interp.io.keys.push_key(0xA);
    exec_opcode(&mut interp, 0xE2A1);
    assert_eq!(interp.state.pc, 0x206);

    interp.io.keys.push_key(0x3);
    exec_opcode(&mut interp, 0xE2A1);
    assert_eq!(interp.state.pc, 0x20A);
}

#[test]
fn opcode_fx07_reads_delay_timer() {
    let mut interp = new_headless_interp();
    interp.state.delay_timer = 0x2A;
    exec_opcode(&mut interp, 0xF307);
    assert_eq!(interp.state.v[3], 0x2A);
}

#[test]
fn opcode_fx0a_blocks_until_key() {
    let mut interp = new_headless_interp();
    interp.io.keys.push_key(0x5);
    exec_opcode(&mut interp, 0xF20A);
    assert_eq!(interp.state.v[2], 0x5);
    assert_eq!(interp.state.pc, 0x202);
    assert_eq!(interp.io.keys.pending(), 0);
}

#[test]
fn opcode_fx0a_reports_closed_input() {
    let mut interp = new_headless_interp();
    let err = try_exec_opcode(&mut interp, 0xF20A).unwrap_err();
    assert_eq!(err, ExecError::InputClosed { pc: 0x200 });
    assert_eq!(interp.state.pc, 0x200);
}

#[test]
fn opcode_fx15_sets_delay_timer() {
    let mut interp = new_headless_interp();
    interp.state.v[4] = 0x3C;
    exec_opcode(&mut interp, 0xF415);
    assert_eq!(interp.state.delay_timer, 0x3C);
}

#[test]
fn opcode_fx18_sets_sound_timer() {
    let mut interp = new_headless_interp();
    interp.state.v[4] = 0x10;
    exec_opcode(&mut interp, 0xF418);
    assert_eq!(interp.state.sound_timer, 0x10);
}

#[test]
fn opcode_fx1e_adds_to_i() {
    let mut interp = new_headless_interp();
    interp.state.i = 0x100;
    interp.state.v[5] = 0x22;
    exec_opcode(&mut interp, 0xF51E);
    assert_eq!(interp.state.i, 0x122);
    assert_eq!(interp.state.v[0xF], 0);
}

#[test]
fn opcode_fx29_sets_sprite_address() {
    let mut interp = new_headless_interp();
    interp.state.v[6] = 0xA;
    exec_opcode(&mut interp, 0xF629);
    assert_eq!(interp.state.i, 0x32);
}

#[test]
fn opcode_fx33_stores_bcd() {
    let mut interp = new_headless_interp();
    interp.state.v[7] = 137;
    interp.state.i = 0x300;
    exec_opcode(&mut interp, 0xF733);
    assert_eq!(interp.state.read_bytes(0x300, 3), vec![1, 3, 7]);
    assert_eq!(interp.state.i, 0x300);
}

#[test]
fn opcode_fx55_stores_registers_inclusive() {
    let mut interp = new_headless_interp();
    interp.state.i = 0x300;
    interp.state.v[..5].copy_from_slice(&[9, 8, 7, 6, 5]);
    exec_opcode(&mut interp, 0xF355);

    assert_eq!(interp.state.read_bytes(0x300, 5), vec![9, 8, 7, 6, 0]);
    assert_eq!(interp.state.i, 0x300);
}

#[test]
fn opcode_fx65_loads_registers_inclusive() {
    let mut interp = new_headless_interp();
    interp.state.i = 0x300;
    interp.state.write_bytes(0x300, &[1, 2, 3, 4]);
    interp.state.v[3] = 0xEE;
    exec_opcode(&mut interp, 0xF265);

    assert_eq!(&interp.state.v[..4], &[1, 2, 3, 0xEE]);
    assert_eq!(interp.state.i, 0x300);
}

#[test]
fn step_never_touches_timers() {
    let mut interp = new_headless_interp();
    interp.state.delay_timer = 9;
    interp.state.sound_timer = 2;
    exec_opcode(&mut interp, 0x6000);
    assert_eq!(interp.state.delay_timer, 9);
    assert_eq!(interp.state.sound_timer, 2);

    interp.state.tick_timers(3);
    assert_eq!(interp.state.delay_timer, 6);
    assert_eq!(interp.state.sound_timer, 0);
}

#[test]
fn pc_wraps_at_end_of_memory() {
    let mut interp = new_headless_interp();
    interp.state.set_pc(0xFFE);
    exec_opcode(&mut interp, 0x6001);
    assert_eq!(interp.state.pc, 0x000);
}
