//! Conditional tracing for the pack/unpack engine.
//!
//! With the `diagnostics` feature the macros forward to `tracing`; without
//! it they expand to nothing and their arguments are never evaluated.

#[cfg(feature = "diagnostics")]
macro_rules! diag_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "diagnostics"))]
macro_rules! diag_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "diagnostics")]
macro_rules! diag_trace {
    ($($arg:tt)*) => { tracing::trace!($($arg)*) };
}

#[cfg(not(feature = "diagnostics"))]
macro_rules! diag_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "diagnostics")]
pub(crate) use self::format::format_elem;

#[cfg(feature = "diagnostics")]
mod format {
    use crate::codec::{decode, sign_extend};
    use crate::element::{ElemKind, ElemType};

    /// Human-readable value of a raw slot, formatted by element kind.
    pub(crate) fn format_elem(elem: ElemType, raw: u64) -> String {
        match elem.kind() {
            ElemKind::Integer if elem.is_signed() => sign_extend(raw, elem.bits()).to_string(),
            ElemKind::Integer => raw.to_string(),
            ElemKind::Bipolar => (if raw & 1 == 1 { "+1" } else { "-1" }).to_string(),
            ElemKind::FixedPoint | ElemKind::Float => decode::<f64>(elem, raw).to_string(),
        }
    }

}
