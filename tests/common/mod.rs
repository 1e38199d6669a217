//! Shared test fixtures
#![allow(dead_code)]

use std::collections::HashMap;

use bytes::{Buf, BufMut, BytesMut};
use num_derive::{FromPrimitive, ToPrimitive};
use shapecodec::{
    enum_codec, extension_codec, record_codec, CodecError, Extension, Field, Overflow, Record,
    Result, Value,
};

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sample {
    pub b: bool,
    pub i: i32,
    pub s: String,
}

impl Record for Sample {
    const TYPE_NAME: &'static str = "Sample";

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("b", |v: &Sample| &v.b, |v: &mut Sample| &mut v.b),
            Field::new("i", |v: &Sample| &v.i, |v: &mut Sample| &mut v.i),
            Field::new("s", |v: &Sample| &v.s, |v: &mut Sample| &mut v.s),
        ]
    }
}

pub fn sample() -> Sample {
    Sample {
        b: true,
        i: 100,
        s: "Hello World".to_string(),
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub nickname: Option<String>,
    pub age: u8,
}

impl Record for Person {
    const TYPE_NAME: &'static str = "Person";

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("name", |p: &Person| &p.name, |p: &mut Person| &mut p.name),
            Field::new("nickname", |p: &Person| &p.nickname, |p: &mut Person| &mut p.nickname),
            Field::new("age", |p: &Person| &p.age, |p: &mut Person| &mut p.age),
        ]
    }
}

pub fn person(name: &str, age: u8) -> Person {
    Person {
        name: name.to_string(),
        nickname: None,
        age,
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Team {
    pub name: String,
    pub members: Vec<Person>,
    pub scores: HashMap<String, i64>,
    pub color: Color,
}

impl Record for Team {
    const TYPE_NAME: &'static str = "Team";

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("name", |t: &Team| &t.name, |t: &mut Team| &mut t.name),
            Field::new("members", |t: &Team| &t.members, |t: &mut Team| &mut t.members),
            Field::new("scores", |t: &Team| &t.scores, |t: &mut Team| &mut t.scores),
            Field::new("color", |t: &Team| &t.color, |t: &mut Team| &mut t.color),
        ]
    }
}

/// Record with a computed field
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Invoice {
    pub quantity: i32,
    pub unit_price: i32,
}

impl Record for Invoice {
    const TYPE_NAME: &'static str = "Invoice";

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("quantity", |v: &Invoice| &v.quantity, |v: &mut Invoice| &mut v.quantity),
            Field::new("unit_price", |v: &Invoice| &v.unit_price, |v: &mut Invoice| &mut v.unit_price),
            Field::read_only("total", |v: &Invoice| v.quantity * v.unit_price),
        ]
    }
}

/// Record that keeps keys it has no field for
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub extra: HashMap<String, Value>,
}

impl Record for Document {
    const TYPE_NAME: &'static str = "Document";

    fn fields() -> Vec<Field<Self>> {
        vec![Field::new("title", |d: &Document| &d.title, |d: &mut Document| &mut d.title)]
    }

    fn overflow() -> Option<Overflow<Self>> {
        Some(Overflow::new(|d: &Document| &d.extra, |d: &mut Document| &mut d.extra))
    }
}

/// Self-referential record
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl Record for TreeNode {
    const TYPE_NAME: &'static str = "TreeNode";

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("label", |n: &TreeNode| &n.label, |n: &mut TreeNode| &mut n.label),
            Field::new("children", |n: &TreeNode| &n.children, |n: &mut TreeNode| &mut n.children),
        ]
    }
}

record_codec!(Sample, Person, Team, Invoice, Document, TreeNode);

// =============================================================================
// Enums
// =============================================================================

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum Color {
    #[default]
    Red = 1,
    Green = 2,
    Blue = 4,
}

enum_codec!(Color);

// =============================================================================
// Extensions
// =============================================================================

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Extension for Vec3 {
    const TAG: u8 = 18;
    const WIDTH: usize = 12;

    fn write_payload(&self, out: &mut BytesMut) {
        out.put_f32_le(self.x);
        out.put_f32_le(self.y);
        out.put_f32_le(self.z);
    }

    fn read_payload(mut payload: &[u8]) -> Result<Self> {
        if payload.len() != Self::WIDTH {
            return Err(CodecError::CorruptData(format!("Vec3 payload of {} bytes", payload.len())));
        }
        Ok(Vec3 {
            x: payload.get_f32_le(),
            y: payload.get_f32_le(),
            z: payload.get_f32_le(),
        })
    }
}

/// Extension whose payload disagrees with its declared width
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Short(pub u16);

impl Extension for Short {
    const TAG: u8 = 19;
    const WIDTH: usize = 4;

    fn write_payload(&self, out: &mut BytesMut) {
        out.put_u16_le(self.0);
    }

    fn read_payload(mut payload: &[u8]) -> Result<Self> {
        Ok(Short(payload.get_u16_le()))
    }
}

extension_codec!(Vec3, Short);

// =============================================================================
// Helpers
// =============================================================================

/// `Value` with `depth` nested sequences
pub fn nested_sequences(depth: usize) -> Value {
    let mut value = Value::Sequence(Vec::new());
    for _ in 1..depth {
        value = Value::Sequence(vec![value]);
    }
    value
}
