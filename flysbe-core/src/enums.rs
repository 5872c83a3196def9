//! Enumerations whose wire form is the constant's name.

/// A fieldless enum with a fixed, ordered set of named constants.
///
/// Usually derived with `#[derive(EnumName)]`.
pub trait NamedEnum: Copy + PartialEq + Send + Sync + 'static {
    /// Every constant in declaration order.
    const VARIANTS: &'static [Self];

    /// The constant's wire name.
    fn name(&self) -> &'static str;
}
