//! Record field tables
//!
//! Records list their fields explicitly; there is no runtime reflection. A field is
//! a name plus typed accessors, erased into boxed functions so one `RecordPlan<T>`
//! can drive every field regardless of its type.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::codec::{Decode, Decoder, Encode, Encoder};
use crate::error::Result;

use super::{FieldLayout, RecordLayout};

type EncodeFieldFn<T> = Box<dyn Fn(&T, &mut Encoder<'_>) -> Result<bool> + Send + Sync>;
type DecodeFieldFn<T> = Box<dyn Fn(&mut T, &mut Decoder<'_, '_>) -> Result<()> + Send + Sync>;
type EncodeEntriesFn<T> = Box<dyn Fn(&T, &mut Encoder<'_>) -> Result<()> + Send + Sync>;
type DecodeEntryFn<T> =
    Box<dyn Fn(&mut T, String, &mut Decoder<'_, '_>) -> Result<()> + Send + Sync>;

fn encode_fn<T, C>(f: C) -> EncodeFieldFn<T>
where
    C: Fn(&T, &mut Encoder<'_>) -> Result<bool> + Send + Sync + 'static,
{
    Box::new(f)
}

fn decode_fn<T, C>(f: C) -> DecodeFieldFn<T>
where
    C: Fn(&mut T, &mut Decoder<'_, '_>) -> Result<()> + Send + Sync + 'static,
{
    Box::new(f)
}

fn encode_entries_fn<T, C>(f: C) -> EncodeEntriesFn<T>
where
    C: Fn(&T, &mut Encoder<'_>) -> Result<()> + Send + Sync + 'static,
{
    Box::new(f)
}

fn decode_entry_fn<T, C>(f: C) -> DecodeEntryFn<T>
where
    C: Fn(&mut T, String, &mut Decoder<'_, '_>) -> Result<()> + Send + Sync + 'static,
{
    Box::new(f)
}

/// A type encoded as a set of named fields
///
/// Implement this and invoke [`record_codec!`](crate::record_codec) to make the type
/// encodable and decodable.
///
/// ```
/// use shapecodec::{record_codec, Field, Record};
///
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Record for Point {
///     const TYPE_NAME: &'static str = "Point";
///
///     fn fields() -> Vec<Field<Self>> {
///         vec![
///             Field::new("x", |p: &Point| &p.x, |p: &mut Point| &mut p.x),
///             Field::new("y", |p: &Point| &p.y, |p: &mut Point| &mut p.y),
///         ]
///     }
/// }
///
/// record_codec!(Point);
/// ```
pub trait Record: Default + 'static {
    /// Name used in error messages and plans
    const TYPE_NAME: &'static str;

    /// Fields in encode order
    fn fields() -> Vec<Field<Self>>;

    /// Map absorbing keys that name no field
    fn overflow() -> Option<Overflow<Self>> {
        None
    }
}

/// One field of a record type `T`
pub struct Field<T> {
    name: &'static str,
    declared: &'static str,
    encode: EncodeFieldFn<T>,
    decode: Option<DecodeFieldFn<T>>,
}

impl<T: 'static> Field<T> {
    /// A field that is encoded and assigned on decode
    pub fn new<F, G, M>(name: &'static str, get: G, get_mut: M) -> Self
    where
        F: Encode + Decode,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        Self {
            name,
            declared: type_name::<F>(),
            encode: encode_fn(move |record, enc| enc.field(name, get(record))),
            decode: Some(decode_fn(move |record, dec| {
                *get_mut(record) = F::decode(dec)?;
                Ok(())
            })),
        }
    }

    /// A field that is encoded but never assigned on decode
    ///
    /// The getter may compute its value. On decode the key is recognized and its
    /// value skipped.
    pub fn read_only<F, G>(name: &'static str, get: G) -> Self
    where
        F: Encode,
        G: Fn(&T) -> F + Send + Sync + 'static,
    {
        Self {
            name,
            declared: type_name::<F>(),
            encode: encode_fn(move |record, enc| {
                let value = get(record);
                enc.field(name, &value)
            }),
            decode: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared(&self) -> &'static str {
        self.declared
    }

    pub fn is_writable(&self) -> bool {
        self.decode.is_some()
    }

    /// Write this field's entry; returns false if the value was absent and omitted
    pub fn encode_from(&self, record: &T, enc: &mut Encoder<'_>) -> Result<bool> {
        (self.encode)(record, enc)
    }

    /// Decode the entry's value into `record`, or skip it for read-only fields
    pub fn decode_into(&self, record: &mut T, dec: &mut Decoder<'_, '_>) -> Result<()> {
        match &self.decode {
            Some(decode) => decode(record, dec),
            None => dec.skip_value(),
        }
    }
}

/// The map a dynamic record stores unknown keys in
pub struct Overflow<T> {
    declared: &'static str,
    encode: EncodeEntriesFn<T>,
    decode: DecodeEntryFn<T>,
}

impl<T: 'static> Overflow<T> {
    pub fn new<M, G, GM>(get: G, get_mut: GM) -> Self
    where
        M: DynamicMap,
        G: Fn(&T) -> &M + Send + Sync + 'static,
        GM: Fn(&mut T) -> &mut M + Send + Sync + 'static,
    {
        Self {
            declared: type_name::<M>(),
            encode: encode_entries_fn(move |record, enc| enc.map_entries(get(record))),
            decode: decode_entry_fn(move |record, key, dec| {
                let value = M::Value::decode(dec)?;
                get_mut(record).insert_entry(key, value);
                Ok(())
            }),
        }
    }

    pub fn declared(&self) -> &'static str {
        self.declared
    }

    pub fn encode_from(&self, record: &T, enc: &mut Encoder<'_>) -> Result<()> {
        (self.encode)(record, enc)
    }

    pub fn decode_into(&self, record: &mut T, key: String, dec: &mut Decoder<'_, '_>) -> Result<()> {
        (self.decode)(record, key, dec)
    }
}

/// Field table of a record type, derived once and shared
pub struct RecordPlan<T> {
    fields: Vec<Field<T>>,
    /// Field name → index into `fields`
    index: HashMap<&'static str, usize>,
    overflow: Option<Overflow<T>>,
}

impl<T: Record> RecordPlan<T> {
    /// Read the field table from the record type
    ///
    /// A repeated field name resolves to its last declaration on decode.
    pub fn derive() -> Self {
        let fields = T::fields();
        let mut index = HashMap::with_capacity(fields.len());
        for (slot, field) in fields.iter().enumerate() {
            if index.insert(field.name, slot).is_some() {
                tracing::warn!("Record {} declares field `{}` twice", T::TYPE_NAME, field.name);
            }
        }

        Self {
            fields,
            index,
            overflow: T::overflow(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    /// Fields in encode order
    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    /// Look up a field by wire key
    pub fn field(&self, key: &str) -> Option<&Field<T>> {
        self.index.get(key).map(|&slot| &self.fields[slot])
    }

    pub fn overflow(&self) -> Option<&Overflow<T>> {
        self.overflow.as_ref()
    }

    pub fn is_dynamic(&self) -> bool {
        self.overflow.is_some()
    }

    /// Type-erased description of this table
    pub fn layout(&self) -> RecordLayout {
        RecordLayout {
            type_name: T::TYPE_NAME,
            fields: self
                .fields
                .iter()
                .enumerate()
                .map(|(slot, field)| FieldLayout {
                    name: field.name,
                    slot,
                    declared: field.declared,
                    writable: field.is_writable(),
                })
                .collect(),
            dynamic: self.is_dynamic(),
        }
    }
}

/// Capability of a free-form string-keyed map
pub trait DynamicMap: Default + 'static {
    type Value: Encode + Decode;

    /// Visit entries in iteration order
    fn for_each_entry(&self, f: &mut dyn FnMut(&str, &Self::Value) -> Result<()>) -> Result<()>;

    /// Insert or replace an entry
    fn insert_entry(&mut self, key: String, value: Self::Value);

    fn entry_count(&self) -> usize;
}

impl<V, S> DynamicMap for HashMap<String, V, S>
where
    V: Encode + Decode,
    S: BuildHasher + Default + 'static,
{
    type Value = V;

    fn for_each_entry(&self, f: &mut dyn FnMut(&str, &V) -> Result<()>) -> Result<()> {
        for (key, value) in self {
            f(key, value)?;
        }
        Ok(())
    }

    fn insert_entry(&mut self, key: String, value: V) {
        self.insert(key, value);
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

impl<V> DynamicMap for BTreeMap<String, V>
where
    V: Encode + Decode,
{
    type Value = V;

    fn for_each_entry(&self, f: &mut dyn FnMut(&str, &V) -> Result<()>) -> Result<()> {
        for (key, value) in self {
            f(key, value)?;
        }
        Ok(())
    }

    fn insert_entry(&mut self, key: String, value: V) {
        self.insert(key, value);
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}
