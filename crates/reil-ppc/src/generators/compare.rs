//! Integer comparison into a condition-register field.

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{byte, dw, dw_lit, qw, shift_by};
use crate::env::TranslationEnvironment;
use crate::helpers::cr_field_bit_names;
use crate::types::XER_SO;

/// Compare `a` with `b` and set the four bits of CR field `field`.
///
/// Signed comparison adds `0x80000000` to both sides so that an unsigned
/// subtraction orders them correctly. The difference is taken in 64 bits:
/// bit 63 is set exactly when `a < b`.
pub fn generate_compare(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    field: u8,
    a: &ReilOperand,
    rhs: &ReilOperand,
    signed: bool,
) {
    let (left, right) = if signed {
        let left = env.next_temp();
        let right = env.next_temp();
        b.add(a.clone(), dw_lit(0x8000_0000), dw(&left));
        b.add(rhs.clone(), dw_lit(0x8000_0000), dw(&right));
        (dw(&left), dw(&right))
    } else {
        (a.clone(), rhs.clone())
    };

    let [lt, gt, eq, so] = cr_field_bit_names(field);
    let diff = env.next_temp();
    b.sub(left, right, qw(&diff));
    b.bsh(qw(&diff), shift_by(OperandSize::Qword, -63), byte(lt));
    b.bisz(qw(&diff), byte(eq));
    let lt_or_eq = env.next_temp();
    b.or(byte(eq), byte(lt), byte(&lt_or_eq));
    b.bisz(byte(&lt_or_eq), byte(gt));
    b.str(byte(XER_SO), byte(so));
}
