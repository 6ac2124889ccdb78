//! Evaluator-backed checks of the lifted semantics, one family at a time.

mod common;

use common::{ADDRESS, execute, lift, machine, run};
use reil_interp::Outcome;

macro_rules! test_case {
    ($name:ident, $text:literal, [$($reg:literal = $value:expr),* $(,)?] => [$($out:literal = $expected:expr),* $(,)?]) => {
        #[test]
        fn $name() {
            let (interp, _) = execute($text, &[$(($reg, $value)),*]);
            $(
                assert_eq!(interp.register($out), Some($expected), "{} after `{}`", $out, $text);
            )*
        }
    };
}

// Add and subtract.
test_case!(add_plain, "add r3, r4, r5", ["%r4" = 2, "%r5" = 3] => ["%r3" = 5, "XEROV" = 0]);
test_case!(add_overflow, "addo r3, r4, r5", ["%r4" = 0x7FFF_FFFF, "%r5" = 1] => [
    "%r3" = 0x8000_0000, "XEROV" = 1, "XERSO" = 1,
]);
test_case!(add_no_overflow, "addo r3, r4, r5", ["%r4" = 1, "%r5" = 1] => [
    "%r3" = 2, "XEROV" = 0, "XERSO" = 0,
]);
test_case!(add_overflow_keeps_summary, "addo r3, r4, r5", ["%r4" = 1, "%r5" = 1, "XERSO" = 1] => [
    "XEROV" = 0, "XERSO" = 1,
]);
test_case!(add_record_negative, "add. r3, r4, r5", ["%r4" = 0, "%r5" = 0xFFFF_FFFE] => [
    "CR0LT" = 1, "CR0GT" = 0, "CR0EQ" = 0, "CR0SO" = 0,
]);
test_case!(add_aliasing_destination, "add. r3, r3, r3", ["%r3" = 0x4000_0000] => [
    "%r3" = 0x8000_0000, "CR0LT" = 1,
]);
test_case!(addic_record_carry, "addic. r3, r1, 65535", ["%r1" = 0x8000_0000] => [
    "%r3" = 0x7FFF_FFFF, "XERCA" = 1, "CR0GT" = 1, "CR0LT" = 0, "CR0EQ" = 0,
]);
test_case!(addc_no_carry, "addc r3, r4, r5", ["%r4" = 1, "%r5" = 2, "XERCA" = 1] => [
    "%r3" = 3, "XERCA" = 0,
]);
test_case!(adde_uses_carry, "adde r3, r4, r5", ["%r4" = 1, "%r5" = 1, "XERCA" = 1] => [
    "%r3" = 3, "XERCA" = 0,
]);
test_case!(addze_propagates_carry, "addze r3, r4", ["%r4" = 0xFFFF_FFFF, "XERCA" = 1] => [
    "%r3" = 0, "XERCA" = 1,
]);
test_case!(addme_subtracts_one, "addme r3, r4", ["%r4" = 5] => ["%r3" = 4, "XERCA" = 1]);
test_case!(addi_r0_is_zero, "addi r3, r0, 5", ["%r0" = 100] => ["%r3" = 5]);
test_case!(addi_negative, "addi r3, r4, -8", ["%r4" = 0x100] => ["%r3" = 0xF8]);
test_case!(addis_shifts, "addis r3, r4, 1", ["%r4" = 2] => ["%r3" = 0x0001_0002]);
test_case!(subi_negates, "subi r3, r4, 4", ["%r4" = 10] => ["%r3" = 6]);
test_case!(subf_operand_order, "subf r3, r4, r5", ["%r4" = 3, "%r5" = 10] => ["%r3" = 7]);
test_case!(sub_swaps_operands, "sub r3, r5, r4", ["%r4" = 3, "%r5" = 10] => ["%r3" = 7]);
test_case!(subfc_no_borrow, "subfc r3, r4, r5", ["%r4" = 3, "%r5" = 10] => [
    "%r3" = 7, "XERCA" = 1,
]);
test_case!(subfc_borrow, "subfc r3, r4, r5", ["%r4" = 10, "%r5" = 3] => [
    "%r3" = 0xFFFF_FFF9, "XERCA" = 0,
]);
test_case!(subfe_with_borrow, "subfe r3, r4, r5", ["%r4" = 3, "%r5" = 10, "XERCA" = 0] => [
    "%r3" = 6,
]);
test_case!(subfic_from_immediate, "subfic r3, r4, 0", ["%r4" = 1] => [
    "%r3" = 0xFFFF_FFFF, "XERCA" = 0,
]);
test_case!(subfze_negates, "subfze r3, r4", ["%r4" = 1, "XERCA" = 1] => ["%r3" = 0xFFFF_FFFF]);
test_case!(subfo_overflow, "subfo r3, r4, r5", ["%r4" = 1, "%r5" = 0x8000_0000] => [
    "%r3" = 0x7FFF_FFFF, "XEROV" = 1,
]);
test_case!(neg_value, "neg r3, r4", ["%r4" = 5] => ["%r3" = 0xFFFF_FFFB]);
test_case!(nego_minimum, "nego r3, r4", ["%r4" = 0x8000_0000] => [
    "%r3" = 0x8000_0000, "XEROV" = 1, "XERSO" = 1,
]);
test_case!(nego_plain, "nego. r3, r4", ["%r4" = 0xFFFF_FFFF] => [
    "%r3" = 1, "XEROV" = 0, "CR0GT" = 1,
]);

// Compare.
test_case!(cmpw_signed, "cmpw cr7, r3, r4", ["%r3" = 0xFFFF_FFFF, "%r4" = 1] => [
    "CR7LT" = 1, "CR7GT" = 0, "CR7EQ" = 0,
]);
test_case!(cmplw_unsigned, "cmplw r3, r4", ["%r3" = 0xFFFF_FFFF, "%r4" = 1] => [
    "CR0LT" = 0, "CR0GT" = 1, "CR0EQ" = 0,
]);
test_case!(cmpwi_negative_equal, "cmpwi r3, -5", ["%r3" = 0xFFFF_FFFB] => [
    "CR0EQ" = 1, "CR0LT" = 0, "CR0GT" = 0,
]);
test_case!(cmplwi_zero_extends, "cmplwi cr1, r3, 0xFFFF", ["%r3" = 0x1_0000] => ["CR1GT" = 1]);
test_case!(cmp_four_operands, "cmp cr2, 0, r3, r4", ["%r3" = 0x8000_0000, "%r4" = 0x7FFF_FFFF] => [
    "CR2LT" = 1,
]);
test_case!(cmpw_copies_summary, "cmpw r3, r4", ["XERSO" = 1] => ["CR0SO" = 1, "CR0EQ" = 1]);

// Multiply and divide.
test_case!(mullw_signed, "mullw r3, r4, r5", ["%r4" = 0xFFFF_FFFD, "%r5" = 7] => [
    "%r3" = 0xFFFF_FFEB,
]);
test_case!(mullwo_overflow, "mullwo r3, r4, r5", ["%r4" = 0x1_0000, "%r5" = 0x1_0000] => [
    "%r3" = 0, "XEROV" = 1,
]);
test_case!(mullwo_negative_fits, "mullwo r3, r4, r5", ["%r4" = 0xFFFF_FFFF, "%r5" = 2] => [
    "%r3" = 0xFFFF_FFFE, "XEROV" = 0,
]);
test_case!(mulhw_signed_high, "mulhw r3, r4, r5", ["%r4" = 0xFFFF_FFFF, "%r5" = 2] => [
    "%r3" = 0xFFFF_FFFF,
]);
test_case!(mulhwu_unsigned_high, "mulhwu r3, r4, r5", ["%r4" = 0xFFFF_FFFF, "%r5" = 2] => [
    "%r3" = 1,
]);
test_case!(mulli_negative, "mulli r3, r4, -3", ["%r4" = 5] => ["%r3" = 0xFFFF_FFF1]);
test_case!(divw_signed, "divw r3, r4, r5", ["%r4" = 0xFFFF_FFF9, "%r5" = 2] => [
    "%r3" = 0xFFFF_FFFD,
]);
test_case!(divwu_unsigned, "divwu r3, r4, r5", ["%r4" = 0xFFFF_FFF9, "%r5" = 2] => [
    "%r3" = 0x7FFF_FFFC,
]);
test_case!(divwu_by_zero_keeps_destination, "divwu. r3, r4, r5", [
    "%r3" = 0x1234, "%r4" = 9, "%r5" = 0,
] => ["%r3" = 0x1234, "CR0GT" = 1]);
test_case!(divwo_by_zero_overflows, "divwo r3, r4, r5", ["%r3" = 7, "%r4" = 9] => [
    "%r3" = 7, "XEROV" = 1, "XERSO" = 1,
]);
test_case!(divwo_minimum_by_minus_one, "divwo r3, r4, r5", [
    "%r3" = 7, "%r4" = 0x8000_0000, "%r5" = 0xFFFF_FFFF,
] => ["%r3" = 7, "XEROV" = 1]);
test_case!(divw_minus_one_divisor, "divwo r3, r4, r5", ["%r4" = 6, "%r5" = 0xFFFF_FFFF] => [
    "%r3" = 0xFFFF_FFFA, "XEROV" = 0,
]);

// Logic.
test_case!(andc_clears, "andc r3, r4, r5", ["%r4" = 0xFF, "%r5" = 0x0F] => ["%r3" = 0xF0]);
test_case!(orc_sets, "orc r3, r4, r5", ["%r4" = 0, "%r5" = 0xFFFF_FF00] => ["%r3" = 0xFF]);
test_case!(nand_value, "nand r3, r4, r5", ["%r4" = 0xFF, "%r5" = 0x0F] => ["%r3" = 0xFFFF_FFF0]);
test_case!(eqv_equal, "eqv r3, r4, r5", ["%r4" = 0x1234, "%r5" = 0x1234] => ["%r3" = 0xFFFF_FFFF]);
test_case!(not_zero, "not r3, r4", [] => ["%r3" = 0xFFFF_FFFF]);
test_case!(xor_record_zero, "xor. r3, r4, r4", ["%r4" = 0x55] => ["%r3" = 0, "CR0EQ" = 1]);
test_case!(andi_record, "andi. r3, r4, 0xFF00", ["%r4" = 0x1234_5678] => [
    "%r3" = 0x5600, "CR0GT" = 1,
]);
test_case!(andis_record, "andis. r3, r4, 0x8000", ["%r4" = 0x8000_0001] => [
    "%r3" = 0x8000_0000, "CR0LT" = 1,
]);
test_case!(oris_value, "oris r3, r4, 0x8000", ["%r4" = 1] => ["%r3" = 0x8000_0001]);
test_case!(xori_zero_extends, "xori r3, r4, 0xFFFF", ["%r4" = 0xFFFF_FFFF] => [
    "%r3" = 0xFFFF_0000,
]);
test_case!(mr_copies, "mr r3, r4", ["%r4" = 42] => ["%r3" = 42]);
test_case!(mr_record, "mr. r3, r4", ["%r4" = 0] => ["CR0EQ" = 1]);
test_case!(li_sign_extends, "li r3, -1", [] => ["%r3" = 0xFFFF_FFFF]);
test_case!(li_hex_sign_extends, "li r3, 0x8000", [] => ["%r3" = 0xFFFF_8000]);
test_case!(lis_shifts, "lis r3, 0x1234", [] => ["%r3" = 0x1234_0000]);
test_case!(extsb_negative, "extsb r3, r4", ["%r4" = 0x1280] => ["%r3" = 0xFFFF_FF80]);
test_case!(extsh_positive, "extsh. r3, r4", ["%r4" = 0xFFFF_7FFF] => [
    "%r3" = 0x7FFF, "CR0GT" = 1,
]);

// Count leading zeros.
test_case!(cntlzw_zero, "cntlzw r3, r4", [] => ["%r3" = 32]);
test_case!(cntlzw_one, "cntlzw r3, r4", ["%r4" = 1] => ["%r3" = 31]);
test_case!(cntlzw_top, "cntlzw r3, r4", ["%r4" = 0x8000_0000] => ["%r3" = 0]);
test_case!(cntlzw_middle, "cntlzw. r3, r4", ["%r4" = 0x0001_0000] => ["%r3" = 15, "CR0GT" = 1]);

// Rotate and mask.
test_case!(rlwinm_extracts_byte, "rlwinm r3, r4, 8, 24, 31", ["%r4" = 0x1234_5678] => [
    "%r3" = 0x12,
]);
test_case!(rlwinm_mask_literal, "rlwinm r3, r4, 0, 0xFF00", ["%r4" = 0x1234_5678] => [
    "%r3" = 0x5600,
]);
test_case!(rlwinm_wrapping_mask, "rlwinm r3, r4, 0, 28, 3", ["%r4" = 0xFFFF_FFFF] => [
    "%r3" = 0xF000_000F,
]);
test_case!(slwi_value, "slwi r3, r4, 4", ["%r4" = 0x1234_5678] => ["%r3" = 0x2345_6780]);
test_case!(srwi_value, "srwi r3, r4, 4", ["%r4" = 0x1234_5678] => ["%r3" = 0x0123_4567]);
test_case!(rotrwi_value, "rotrwi r3, r4, 8", ["%r4" = 0x1234_5678] => ["%r3" = 0x7812_3456]);
test_case!(clrlwi_value, "clrlwi r3, r4, 16", ["%r4" = 0x1234_5678] => ["%r3" = 0x5678]);
test_case!(clrrwi_value, "clrrwi r3, r4, 4", ["%r4" = 0x1234_5678] => ["%r3" = 0x1234_5670]);
test_case!(clrlslwi_value, "clrlslwi r3, r4, 24, 2", ["%r4" = 0x1234_5678] => ["%r3" = 0x1E0]);
test_case!(extlwi_value, "extlwi r3, r4, 8, 8", ["%r4" = 0x1234_5678] => ["%r3" = 0x3400_0000]);
test_case!(extrwi_value, "extrwi r3, r4, 8, 8", ["%r4" = 0x1234_5678] => ["%r3" = 0x34]);
test_case!(rlwimi_preserves_bits, "rlwimi r3, r4, 0, 24, 31", [
    "%r3" = 0xAABB_CCDD, "%r4" = 0x1122_3344,
] => ["%r3" = 0xAABB_CC44]);
test_case!(inslwi_top_byte, "inslwi r3, r4, 8, 0", [
    "%r3" = 0xAABB_CCDD, "%r4" = 0x1122_3344,
] => ["%r3" = 0x11BB_CCDD]);
test_case!(insrwi_low_byte, "insrwi r3, r4, 8, 24", [
    "%r3" = 0xAABB_CCDD, "%r4" = 0x1122_3344,
] => ["%r3" = 0xAABB_CC44]);
test_case!(rotlw_uses_low_bits, "rotlw r3, r4, r5", ["%r4" = 0x8000_0001, "%r5" = 36] => [
    "%r3" = 0x18,
]);
test_case!(rlwnm_record, "rlwnm. r3, r4, r5, 0, 31", ["%r4" = 0x8000_0000, "%r5" = 1] => [
    "%r3" = 1, "CR0GT" = 1,
]);

// Shifts.
test_case!(slw_small, "slw r3, r4, r5", ["%r4" = 1, "%r5" = 4] => ["%r3" = 0x10]);
test_case!(slw_out_of_range, "slw r3, r4, r5", ["%r4" = 1, "%r5" = 32] => ["%r3" = 0]);
test_case!(srw_out_of_range, "srw r3, r4, r5", ["%r4" = 0x8000_0000, "%r5" = 33] => ["%r3" = 0]);
test_case!(srw_uses_six_bits, "srw r3, r4, r5", ["%r4" = 0x8000_0000, "%r5" = 0x44] => [
    "%r3" = 0x0800_0000,
]);
test_case!(sraw_large_negative, "sraw r3, r4, r5", ["%r4" = 0x8000_0000, "%r5" = 40] => [
    "%r3" = 0xFFFF_FFFF, "XERCA" = 1,
]);
test_case!(sraw_large_positive, "sraw r3, r4, r5", ["%r4" = 0x7FFF_FFFF, "%r5" = 40] => [
    "%r3" = 0, "XERCA" = 0,
]);
test_case!(srawi_lost_bits, "srawi r3, r4, 4", ["%r4" = 0xFFFF_FFF1] => [
    "%r3" = 0xFFFF_FFFF, "XERCA" = 1,
]);
test_case!(srawi_exact, "srawi r3, r4, 4", ["%r4" = 0xFFFF_FFF0, "XERCA" = 1] => [
    "%r3" = 0xFFFF_FFFF, "XERCA" = 0,
]);
test_case!(srawi_positive, "srawi. r3, r4, 4", ["%r4" = 0x13] => [
    "%r3" = 1, "XERCA" = 0, "CR0GT" = 1,
]);

// Condition register.
test_case!(crxor_clears, "crxor 6, 6, 6", ["CR1EQ" = 1] => ["CR1EQ" = 0]);
test_case!(cror_symbolic, "cror 4*cr1+eq, lt, gt", ["CR0LT" = 1] => ["CR1EQ" = 1]);
test_case!(crandc_value, "crandc 0, 1, 2", ["CR0GT" = 1, "CR0EQ" = 0] => ["CR0LT" = 1]);
test_case!(crnand_value, "crnand 0, 1, 2", ["CR0GT" = 1, "CR0EQ" = 1, "CR0LT" = 1] => [
    "CR0LT" = 0,
]);
test_case!(crset_eq, "crset eq", [] => ["CR0EQ" = 1]);
test_case!(crclr_bit, "crclr 31", ["CR7SO" = 1] => ["CR7SO" = 0]);
test_case!(crnot_inverts, "crnot 0, 1", [] => ["CR0LT" = 1]);
test_case!(mcrf_copies_field, "mcrf cr2, cr0", ["CR0LT" = 1, "CR0SO" = 1, "CR2GT" = 1] => [
    "CR2LT" = 1, "CR2GT" = 0, "CR2EQ" = 0, "CR2SO" = 1,
]);
test_case!(mtcrf_selected_field, "mtcrf 0x80, r3", ["%r3" = 0xA000_000F, "CR7EQ" = 1] => [
    "CR0LT" = 1, "CR0GT" = 0, "CR0EQ" = 1, "CR0SO" = 0, "CR7EQ" = 1, "CR7SO" = 0,
]);
test_case!(mtcr_all_fields, "mtcr r3", ["%r3" = 0x0000_0001, "CR0LT" = 1] => [
    "CR0LT" = 0, "CR7SO" = 1,
]);
test_case!(mfcr_assembles, "mfcr r3", ["CR0LT" = 1, "CR7SO" = 1, "CR3EQ" = 1] => [
    "%r3" = 0x8002_0001,
]);
test_case!(mfocrf_keeps_other_bits, "mfocrf r3, 0x01", ["%r3" = 0xFFFF_FFF0, "CR7GT" = 1] => [
    "%r3" = 0xFFFF_FFF4,
]);
test_case!(mcrxr_moves_and_clears, "mcrxr cr1", ["XERSO" = 1, "XERCA" = 1, "CR1SO" = 1] => [
    "CR1LT" = 1, "CR1GT" = 0, "CR1EQ" = 1, "CR1SO" = 0, "XERSO" = 0, "XERCA" = 0,
]);

// Special registers.
test_case!(mfxer_composes, "mfxer r3", ["XERSO" = 1, "XERCA" = 1] => ["%r3" = 0xA000_0000]);
test_case!(mtxer_decomposes, "mtxer r3", ["%r3" = 0x6000_0000, "XERSO" = 1] => [
    "XERSO" = 0, "XEROV" = 1, "XERCA" = 1,
]);
test_case!(mtctr_value, "mtctr r3", ["%r3" = 99] => ["CTR" = 99]);
test_case!(mflr_value, "mflr r0", ["LR" = 0x2000] => ["%r0" = 0x2000]);
test_case!(mfspr_aliases_lr, "mfspr r3, 8", ["LR" = 0x44] => ["%r3" = 0x44]);
test_case!(mtspr_numbered, "mtspr 272, r3", ["%r3" = 5] => ["SPR272" = 5]);
test_case!(mfmsr_value, "mfmsr r3", ["MSR" = 0x9032] => ["%r3" = 0x9032]);
test_case!(mftb_lower, "mftb r3", ["TBL" = 7, "TBU" = 8] => ["%r3" = 7]);
test_case!(mftbu_upper, "mftbu r3", ["TBL" = 7, "TBU" = 8] => ["%r3" = 8]);
test_case!(mfsrr0_reads_spr26, "mfsrr0 r3", ["SPR26" = 0x1_2340] => ["%r3" = 0x1_2340]);
test_case!(mtsrr1_writes_spr27, "mtsrr1 r3", ["%r3" = 0x9032] => ["SPR27" = 0x9032]);
test_case!(mfdec_reads_spr22, "mfdec r3", ["SPR22" = 77] => ["%r3" = 77]);
test_case!(mtsprg0_writes_spr272, "mtsprg0 r4", ["%r4" = 3] => ["SPR272" = 3]);
test_case!(mfdar_reads_spr19, "mfdar r3", ["SPR19" = 0xBAD0] => ["%r3" = 0xBAD0]);
test_case!(mfpvr_reads_spr287, "mfpvr r3", ["SPR287" = 0x0008_0200] => ["%r3" = 0x0008_0200]);
test_case!(mfsr_direct, "mfsr r3, 3", ["SR3" = 0x55] => ["%r3" = 0x55]);
test_case!(mtsr_direct, "mtsr 3, r4", ["%r4" = 0x66] => ["SR3" = 0x66]);

#[test]
fn test_segment_register_indirect() {
    let segments: Vec<(String, u64)> = (0..16u64).map(|sr| (format!("SR{sr}"), 0x100 + sr)).collect();
    let mut interp = machine(&[("%r5", 0x3000_0000), ("%r4", 0xABCD)]);
    for (name, value) in &segments {
        interp.set_register(name, *value);
    }

    run(&mut interp, "mfsrin r3, r5");
    assert_eq!(interp.register("%r3"), Some(0x103));

    run(&mut interp, "mtsrin r4, r5");
    assert_eq!(interp.register("SR3"), Some(0xABCD));
    for sr in (0..16u64).filter(|&sr| sr != 3) {
        assert_eq!(interp.register(&format!("SR{sr}")), Some(0x100 + sr), "SR{sr}");
    }

    interp.set_register("%r5", 0xF000_0000);
    run(&mut interp, "mfsrin r5, r5");
    assert_eq!(interp.register("%r5"), Some(0x10F));
}

#[test]
fn test_return_from_interrupt() {
    let (interp, outcome) = execute("rfi", &[("SPR26", 0x2002), ("SPR27", 0x9032), ("MSR", 0)]);
    assert_eq!(outcome, branch_to(0x2000, false));
    assert_eq!(interp.register("MSR"), Some(0x9032));
}

fn branch_to(target: u64, is_call: bool) -> Outcome {
    Outcome::Branch { target, is_call }
}

#[test]
fn test_unconditional_branches() {
    let (_, outcome) = execute("b 0x2000", &[]);
    assert_eq!(outcome, branch_to(0x2000, false));

    let (interp, outcome) = execute("bl 0x2000", &[]);
    assert_eq!(outcome, branch_to(0x2000, true));
    assert_eq!(interp.register("LR"), Some(ADDRESS + 4));

    let (_, outcome) = execute("blr", &[("LR", 0x3000)]);
    assert_eq!(outcome, branch_to(0x3000, false));

    let (interp, outcome) = execute("blrl", &[("LR", 0x3000)]);
    assert_eq!(outcome, branch_to(0x3000, true));
    assert_eq!(interp.register("LR"), Some(ADDRESS + 4));

    let (_, outcome) = execute("bctrl", &[("CTR", 0x4000)]);
    assert_eq!(outcome, branch_to(0x4000, true));
}

#[test]
fn test_conditional_branches() {
    let (_, outcome) = execute("beq cr1, 0x2000", &[("CR1EQ", 1)]);
    assert_eq!(outcome, branch_to(0x2000, false));
    let (_, outcome) = execute("beq cr1, 0x2000", &[("CR0EQ", 1)]);
    assert_eq!(outcome, Outcome::FallThrough);

    let (_, outcome) = execute("bne+ 0x2000", &[]);
    assert_eq!(outcome, branch_to(0x2000, false));
    let (_, outcome) = execute("bge- cr7, 0x2000", &[("CR7LT", 1)]);
    assert_eq!(outcome, Outcome::FallThrough);

    let (_, outcome) = execute("bltlr", &[("CR0LT", 1), ("LR", 0x500)]);
    assert_eq!(outcome, branch_to(0x500, false));
    let (interp, outcome) = execute("bnectrl cr2", &[("CTR", 0x600)]);
    assert_eq!(outcome, branch_to(0x600, true));
    assert_eq!(interp.register("LR"), Some(ADDRESS + 4));

    let (_, outcome) = execute("bt 4*cr1+gt, 0x2000", &[("CR1GT", 1)]);
    assert_eq!(outcome, branch_to(0x2000, false));
    let (_, outcome) = execute("bf 5, 0x2000", &[("CR1GT", 1)]);
    assert_eq!(outcome, Outcome::FallThrough);
}

#[test]
fn test_counter_branches() {
    let (interp, outcome) = execute("bdnz 0x2000", &[("CTR", 2)]);
    assert_eq!(outcome, branch_to(0x2000, false));
    assert_eq!(interp.register("CTR"), Some(1));

    let (interp, outcome) = execute("bdnz 0x2000", &[("CTR", 1)]);
    assert_eq!(outcome, Outcome::FallThrough);
    assert_eq!(interp.register("CTR"), Some(0));

    let (_, outcome) = execute("bdz 0x2000", &[("CTR", 1)]);
    assert_eq!(outcome, branch_to(0x2000, false));

    let (_, outcome) = execute("bdnzf eq, 0x2000", &[("CTR", 5)]);
    assert_eq!(outcome, branch_to(0x2000, false));
    let (_, outcome) = execute("bdnzf eq, 0x2000", &[("CTR", 5), ("CR0EQ", 1)]);
    assert_eq!(outcome, Outcome::FallThrough);
    let (_, outcome) = execute("bdzt lt, 0x2000", &[("CTR", 1), ("CR0LT", 1)]);
    assert_eq!(outcome, branch_to(0x2000, false));
}

#[test]
fn test_dynamic_branches() {
    // BO=12: branch if the CR bit is set, CTR untouched.
    let (interp, outcome) = execute("bc 12, 2, 0x2000", &[("CR0EQ", 1), ("CTR", 9)]);
    assert_eq!(outcome, branch_to(0x2000, false));
    assert_eq!(interp.register("CTR"), Some(9));
    let (_, outcome) = execute("bc 12, 2, 0x2000", &[]);
    assert_eq!(outcome, Outcome::FallThrough);

    // BO=16: decrement, branch if CTR != 0.
    let (interp, outcome) = execute("bc 16, 0, 0x2000", &[("CTR", 3)]);
    assert_eq!(outcome, branch_to(0x2000, false));
    assert_eq!(interp.register("CTR"), Some(2));

    // BO=20: always.
    let (_, outcome) = execute("bcctr 20, 0", &[("CTR", 0x4000)]);
    assert_eq!(outcome, branch_to(0x4000, false));
    let (interp, outcome) = execute("bclrl 20, 0", &[("LR", 0x4400)]);
    assert_eq!(outcome, branch_to(0x4400, true));
    assert_eq!(interp.register("LR"), Some(ADDRESS + 4));
}

#[test]
fn test_loads() {
    let mut interp = machine(&[("%r1", 0x100), ("%r4", 0x200), ("%r5", 4)]);
    interp.memory_mut().store(0x108, 0xDEAD_BEEF, 4);
    interp.memory_mut().store(0x200, 0x8001, 2);
    interp.memory_mut().store(0x204, 0x1234_5678, 4);

    run(&mut interp, "lwz r3, 8(r1)");
    assert_eq!(interp.register("%r3"), Some(0xDEAD_BEEF));
    run(&mut interp, "lha r3, 0(r4)");
    assert_eq!(interp.register("%r3"), Some(0xFFFF_8001));
    run(&mut interp, "lhz r3, 0(r4)");
    assert_eq!(interp.register("%r3"), Some(0x8001));
    run(&mut interp, "lbzx r3, r4, r5");
    assert_eq!(interp.register("%r3"), Some(0x12));
    run(&mut interp, "lhbrx r3, 0, r4");
    assert_eq!(interp.register("%r3"), Some(0x0180));
    run(&mut interp, "lwbrx r3, r4, r5");
    assert_eq!(interp.register("%r3"), Some(0x7856_3412));
    run(&mut interp, "eciwx r3, r4, r5");
    assert_eq!(interp.register("%r3"), Some(0x1234_5678));

    run(&mut interp, "lwzu r3, 4(r4)");
    assert_eq!(interp.register("%r3"), Some(0x1234_5678));
    assert_eq!(interp.register("%r4"), Some(0x204));
}

#[test]
fn test_stores() {
    let mut interp = machine(&[("%r1", 0x1000), ("%r3", 0xDEAD_BEEF), ("%r4", 0x300)]);

    run(&mut interp, "stw r3, 8(r4)");
    assert_eq!(interp.memory().load(0x308, 4), 0xDEAD_BEEF);
    run(&mut interp, "sth r3, 0x10(r4)");
    assert_eq!(interp.memory().load(0x310, 2), 0xBEEF);
    assert!(!interp.memory().is_written(0x312));
    run(&mut interp, "stb r3, -1(r4)");
    assert_eq!(interp.memory().load(0x2FF, 1), 0xEF);
    run(&mut interp, "stwbrx r3, 0, r4");
    assert_eq!(interp.memory().load(0x300, 4), 0xEFBE_ADDE);

    run(&mut interp, "stwu r1, -16(r1)");
    assert_eq!(interp.memory().load(0xFF0, 4), 0x1000);
    assert_eq!(interp.register("%r1"), Some(0xFF0));

    run(&mut interp, "ecowx r3, r4, r1");
    assert_eq!(interp.memory().load(0x12F0, 4), 0xDEAD_BEEF);
}

#[test]
fn test_store_conditional_succeeds() {
    let (interp, _) = execute("stwcx. r3, 0, r4", &[("%r3", 9), ("%r4", 0x40), ("XERSO", 1)]);
    assert_eq!(interp.memory().load(0x40, 4), 9);
    assert_eq!(interp.register("CR0EQ"), Some(1));
    assert_eq!(interp.register("CR0LT"), Some(0));
    assert_eq!(interp.register("CR0SO"), Some(1));
}

#[test]
fn test_multiple_word_transfers() {
    let mut interp = machine(&[
        ("%r1", 0x100),
        ("%r29", 0x29),
        ("%r30", 0x30),
        ("%r31", 0x31),
    ]);
    run(&mut interp, "stmw r29, 8(r1)");
    assert_eq!(interp.memory().load(0x108, 4), 0x29);
    assert_eq!(interp.memory().load(0x10C, 4), 0x30);
    assert_eq!(interp.memory().load(0x110, 4), 0x31);

    let mut interp2 = machine(&[("%r1", 0x100)]);
    for (k, value) in [0x29u64, 0x30, 0x31].into_iter().enumerate() {
        interp2.memory_mut().store(0x108 + 4 * k as u64, value, 4);
    }
    run(&mut interp2, "lmw r30, 12(r1)");
    assert_eq!(interp2.register("%r30"), Some(0x30));
    assert_eq!(interp2.register("%r31"), Some(0x31));
}

#[test]
fn test_string_transfers() {
    let mut interp = machine(&[("%r4", 0x80), ("%r6", 0xFFFF_FFFF)]);
    for offset in 0..6u64 {
        interp.memory_mut().write_u8(0x80 + offset, offset as u8 + 1);
    }
    run(&mut interp, "lswi r5, r4, 6");
    assert_eq!(interp.register("%r5"), Some(0x0102_0304));
    assert_eq!(interp.register("%r6"), Some(0x0506_0000));

    run(&mut interp, "stswi r5, r4, 5");
    assert_eq!(interp.memory().load(0x80, 4), 0x0102_0304);
    assert_eq!(interp.memory().read_u8(0x84), 0x05);
    assert_eq!(interp.memory().read_u8(0x85), 0x06);

    let (interp, _) = execute("lswi r31, r0, 8", &[]);
    assert_eq!(interp.register("%r0"), Some(0));
    assert_eq!(interp.register("%r31"), Some(0));
}

#[test]
fn test_zero_block() {
    let mut interp = machine(&[("%r4", 0x1234)]);
    interp.memory_mut().store(0x1224, 0xFFFF_FFFF, 4);
    interp.memory_mut().write_u8(0x1240, 0xAA);
    run(&mut interp, "dcbz 0, r4");
    assert_eq!(interp.memory().load(0x1224, 4), 0);
    assert!(interp.memory().is_written(0x1220));
    assert!(interp.memory().is_written(0x123F));
    assert_eq!(interp.memory().read_u8(0x1240), 0xAA);
}

#[test]
fn test_nop_family() {
    for text in [
        "nop", "sync", "isync", "eieio", "dcbt r3, r4", "icbi 0, r9", "tlbie r4", "tlbia",
    ] {
        let ir = lift(text);
        assert_eq!(ir.len(), 1, "{text}");
        assert_eq!(ir[0].opcode, reil_ir::ReilOpcode::Nop, "{text}");
    }
}
