//! Impl generators
//!
//! Records, extensions and enums each need the same three impls (`Shaped`,
//! `Encode`, `Decode`). Blanket impls over `Record` or `Extension` would collide
//! with the std impls, so the macros write them per type instead.

/// Implement `Shaped`, `Encode` and `Decode` for types implementing [`Record`](crate::Record)
///
/// ```
/// use shapecodec::{record_codec, Codec, Field, Record};
///
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct Tagged {
///     label: String,
/// }
///
/// impl Record for Tagged {
///     const TYPE_NAME: &'static str = "Tagged";
///
///     fn fields() -> Vec<Field<Self>> {
///         vec![Field::new("label", |t: &Tagged| &t.label, |t: &mut Tagged| &mut t.label)]
///     }
/// }
///
/// record_codec!(Tagged);
///
/// let codec = Codec::new();
/// let value = Tagged { label: "x".to_string() };
/// let bytes = codec.encode(&value).unwrap();
/// assert_eq!(codec.decode::<Tagged>(&bytes).unwrap(), value);
/// ```
#[macro_export]
macro_rules! record_codec {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Shaped for $ty {
            fn describe() -> $crate::ShapePlan {
                $crate::ShapePlan::record::<$ty>()
            }
        }

        impl $crate::Encode for $ty {
            fn encode(&self, enc: &mut $crate::Encoder<'_>) -> $crate::Result<()> {
                enc.record(self)
            }
        }

        impl $crate::Decode for $ty {
            fn decode(dec: &mut $crate::Decoder<'_, '_>) -> $crate::Result<Self> {
                dec.record()
            }
        }
    )+};
}

/// Implement `Shaped`, `Encode` and `Decode` for types implementing [`Extension`](crate::Extension)
///
/// The tag must also be registered on the codec through
/// [`CodecBuilder::extension`](crate::CodecBuilder::extension).
#[macro_export]
macro_rules! extension_codec {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Shaped for $ty {
            fn describe() -> $crate::ShapePlan {
                $crate::ShapePlan::Extension {
                    type_name: ::std::any::type_name::<$ty>(),
                    tag: <$ty as $crate::Extension>::TAG,
                    width: <$ty as $crate::Extension>::WIDTH,
                }
            }
        }

        impl $crate::Encode for $ty {
            fn encode(&self, enc: &mut $crate::Encoder<'_>) -> $crate::Result<()> {
                enc.put_extension(self)
            }
        }

        impl $crate::Decode for $ty {
            fn decode(dec: &mut $crate::Decoder<'_, '_>) -> $crate::Result<Self> {
                dec.read_extension()
            }
        }
    )+};
}

/// Implement `Shaped`, `Encode` and `Decode` for enums with `i32` discriminants
///
/// The enum must implement `num_traits::ToPrimitive` and `FromPrimitive`
/// (usually via `num-derive`). Enums are written as their underlying integer;
/// decoding an integer with no matching variant is corrupt input.
#[macro_export]
macro_rules! enum_codec {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Shaped for $ty {
            fn describe() -> $crate::ShapePlan {
                $crate::ShapePlan::scalar::<$ty>($crate::Tag::Enum)
            }
        }

        impl $crate::Encode for $ty {
            fn encode(&self, enc: &mut $crate::Encoder<'_>) -> $crate::Result<()> {
                let value = $crate::num_traits::ToPrimitive::to_i32(self).ok_or_else(|| {
                    $crate::CodecError::UnsupportedValue(::std::format!(
                        "{} variant has no i32 representation",
                        ::std::any::type_name::<$ty>()
                    ))
                })?;
                enc.put_enum(value);
                Ok(())
            }
        }

        impl $crate::Decode for $ty {
            fn decode(dec: &mut $crate::Decoder<'_, '_>) -> $crate::Result<Self> {
                let value = dec.read_enum()?;
                <$ty as $crate::num_traits::FromPrimitive>::from_i32(value).ok_or_else(|| {
                    $crate::CodecError::CorruptData(::std::format!(
                        "{} has no variant with value {}",
                        ::std::any::type_name::<$ty>(),
                        value
                    ))
                })
            }
        }
    )+};
}
