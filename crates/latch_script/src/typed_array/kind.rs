//! Element kinds and the native types that back them.
//!
//! `ElementKind` is the runtime tag; the `TypedKind` markers in [`kinds`]
//! carry the same association at compile time so the facade can hand out
//! correctly typed vectors without any runtime branching.

use bytemuck::Pod;
use std::fmt;

/// Logical element kind of a script-visible typed array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Int8Array,
    Int16Array,
    Int32Array,
    Uint8Array,
    Uint8ClampedArray,
    Uint16Array,
    Uint32Array,
    Float32Array,
    Float64Array,
    /// Untyped `ArrayBuffer`; carries no element width of its own.
    ArrayBuffer,
    /// Not a typed array or buffer at all.
    None,
}

impl ElementKind {
    pub const ALL: [ElementKind; 11] = [
        ElementKind::Int8Array,
        ElementKind::Int16Array,
        ElementKind::Int32Array,
        ElementKind::Uint8Array,
        ElementKind::Uint8ClampedArray,
        ElementKind::Uint16Array,
        ElementKind::Uint32Array,
        ElementKind::Float32Array,
        ElementKind::Float64Array,
        ElementKind::ArrayBuffer,
        ElementKind::None,
    ];

    /// Size in bytes of one native element.
    pub const fn byte_width(self) -> usize {
        match self {
            ElementKind::Int8Array => 1,
            ElementKind::Int16Array => 2,
            ElementKind::Int32Array => 4,
            ElementKind::Uint8Array => 1,
            ElementKind::Uint8ClampedArray => 1,
            ElementKind::Uint16Array => 2,
            ElementKind::Uint32Array => 4,
            ElementKind::Float32Array => 4,
            ElementKind::Float64Array => 8,
            ElementKind::ArrayBuffer => 1,
            ElementKind::None => 1,
        }
    }

    /// True for the nine element-typed views.
    pub const fn is_typed_array(self) -> bool {
        !matches!(self, ElementKind::ArrayBuffer | ElementKind::None)
    }

    /// Script-side name, identical to the global constructor and `toStringTag`.
    pub const fn as_str(self) -> &'static str {
        match self {
            ElementKind::Int8Array => "Int8Array",
            ElementKind::Int16Array => "Int16Array",
            ElementKind::Int32Array => "Int32Array",
            ElementKind::Uint8Array => "Uint8Array",
            ElementKind::Uint8ClampedArray => "Uint8ClampedArray",
            ElementKind::Uint16Array => "Uint16Array",
            ElementKind::Uint32Array => "Uint32Array",
            ElementKind::Float32Array => "Float32Array",
            ElementKind::Float64Array => "Float64Array",
            ElementKind::ArrayBuffer => "ArrayBuffer",
            ElementKind::None => "None",
        }
    }

    /// Resolve a script `toStringTag` to a kind.
    pub fn from_tag(tag: &str) -> Option<ElementKind> {
        ElementKind::ALL
            .into_iter()
            .filter(|kind| *kind != ElementKind::None)
            .find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Native storage type of a typed array element.
pub trait Element: Pod + fmt::Debug + sealed::Sealed {
    /// Erase the element type so the slice can cross the backend trait.
    fn wrap(data: &[Self]) -> ElementSlice<'_>;
}

/// A borrowed run of native elements with its type erased.
#[derive(Debug, Clone, Copy)]
pub enum ElementSlice<'a> {
    I8(&'a [i8]),
    U8(&'a [u8]),
    I16(&'a [i16]),
    U16(&'a [u16]),
    I32(&'a [i32]),
    U32(&'a [u32]),
    F32(&'a [f32]),
    F64(&'a [f64]),
}

/// Expand `$body` once per variant with `$slice` bound to the typed slice.
macro_rules! with_slice {
    ($data:expr, |$slice:ident| $body:expr) => {
        match $data {
            $crate::typed_array::kind::ElementSlice::I8($slice) => $body,
            $crate::typed_array::kind::ElementSlice::U8($slice) => $body,
            $crate::typed_array::kind::ElementSlice::I16($slice) => $body,
            $crate::typed_array::kind::ElementSlice::U16($slice) => $body,
            $crate::typed_array::kind::ElementSlice::I32($slice) => $body,
            $crate::typed_array::kind::ElementSlice::U32($slice) => $body,
            $crate::typed_array::kind::ElementSlice::F32($slice) => $body,
            $crate::typed_array::kind::ElementSlice::F64($slice) => $body,
        }
    };
}
pub(crate) use with_slice;

impl<'a> ElementSlice<'a> {
    pub fn len(&self) -> usize {
        with_slice!(self, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        with_slice!(*self, |s| bytemuck::cast_slice(s))
    }
}

macro_rules! impl_element {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $native {}

            impl Element for $native {
                #[inline]
                fn wrap(data: &[Self]) -> ElementSlice<'_> {
                    ElementSlice::$variant(data)
                }
            }
        )*
    };
}

impl_element! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    f32 => F32,
    f64 => F64,
}

/// Compile-time association between a kind and its native element type.
pub trait TypedKind: 'static {
    const KIND: ElementKind;
    type Native: Element;
}

/// Declare a marker type implementing [`TypedKind`].
///
/// The native type's size is checked against `ElementKind::byte_width`
/// at compile time.
///
/// # Example
/// ```ignore
/// define_kind!(Float32Array => Float32Array, f32);
/// ```
macro_rules! define_kind {
    ($marker:ident => $variant:ident, $native:ty) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $marker;

        impl $crate::typed_array::kind::TypedKind for $marker {
            const KIND: $crate::typed_array::kind::ElementKind =
                $crate::typed_array::kind::ElementKind::$variant;
            type Native = $native;
        }

        const _: () = assert!(
            ::std::mem::size_of::<$native>()
                == $crate::typed_array::kind::ElementKind::$variant.byte_width()
        );
    };
}

/// Marker types, one per [`ElementKind`].
pub mod kinds {
    define_kind!(Int8Array => Int8Array, i8);
    define_kind!(Int16Array => Int16Array, i16);
    define_kind!(Int32Array => Int32Array, i32);
    define_kind!(Uint8Array => Uint8Array, u8);
    define_kind!(Uint8ClampedArray => Uint8ClampedArray, u8);
    define_kind!(Uint16Array => Uint16Array, u16);
    define_kind!(Uint32Array => Uint32Array, u32);
    define_kind!(Float32Array => Float32Array, f32);
    define_kind!(Float64Array => Float64Array, f64);
    define_kind!(RawBuffer => ArrayBuffer, u8);
    define_kind!(NoneKind => None, u8);
}
