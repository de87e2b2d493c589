//! Section form models.
//!
//! Every section is a plain value type. Updates never mutate in place: they
//! return a new value, so callers can compare old and new for change detection.
//! No section validates itself; validation is run explicitly before a save.

use std::fmt;

/// Field-level access shared by all section forms
pub trait SectionForm: Clone + PartialEq + Sized {
    /// Enumerates the editable text fields of the section
    type Field: Copy + PartialEq + fmt::Debug;

    /// Current value of a field
    fn field(&self, field: Self::Field) -> &str;

    /// Mutable slot for a field; use [`SectionForm::with_field`] from outside
    #[doc(hidden)]
    fn field_mut(&mut self, field: Self::Field) -> &mut String;

    /// Field name as reported in validation errors
    fn field_name(field: Self::Field) -> &'static str;

    /// Whether the field is computed and must not be edited directly
    fn is_derived(field: Self::Field) -> bool;

    /// Return a copy with one field replaced
    fn with_field(&self, field: Self::Field, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        *next.field_mut(field) = value.into();
        next
    }

    /// Replace the whole section
    fn replace(&self, whole: Self) -> Self {
        whole
    }
}

/// Declares a section's field enum and its [`SectionForm`] implementation.
///
/// ```ignore
/// section_fields! {
///     Diagnosis => DiagnosisField {
///         Principal => principal,
///         Cie10 => cie10,
///     }
/// }
/// ```
macro_rules! section_fields {
    (
        $(#[$meta:meta])*
        $section:ty => $name:ident {
            $($variant:ident => $member:ident),+ $(,)?
        }
        $(derived [$($derived:ident),+ $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every field, in form order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Field name as reported in validation errors
            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($member)),+
                }
            }
        }

        impl $crate::forms::SectionForm for $section {
            type Field = $name;

            fn field(&self, field: $name) -> &str {
                match field {
                    $($name::$variant => &self.$member),+
                }
            }

            fn field_mut(&mut self, field: $name) -> &mut String {
                match field {
                    $($name::$variant => &mut self.$member),+
                }
            }

            fn field_name(field: $name) -> &'static str {
                field.key()
            }

            #[allow(unused_variables)]
            fn is_derived(field: $name) -> bool {
                false $($(|| field == $name::$derived)+)?
            }
        }
    };
}

pub(crate) use section_fields;
