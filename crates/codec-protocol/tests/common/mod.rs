// crates/codec-protocol/tests/common/mod.rs
//
// Builds descriptor streams node by node, returning each node's index so
// later nodes can refer to it.
#![allow(dead_code)]

use codec_core::{ScalarType, Uuid, Writer};
use codec_protocol::wire_types::cardinality;
use codec_protocol::Dialect;

pub const ONE: u8 = cardinality::ONE;
pub const AT_MOST_ONE: u8 = cardinality::AT_MOST_ONE;

/// Shape element: flags, cardinality, name, type index.
pub struct Elem<'a> {
    pub flags: u32,
    pub card: u8,
    pub name: &'a str,
    pub ty: u16,
}

pub fn elem(name: &str, ty: u16, card: u8) -> Elem<'_> {
    Elem {
        flags: 0,
        card,
        name,
        ty,
    }
}

pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(0xdead_0000_0000_0000_0000_0000_0000_0000 | n)
}

pub struct Stream {
    pub dialect: Dialect,
    w: Writer,
    count: u16,
}

impl Stream {
    pub fn v1() -> Self {
        Stream {
            dialect: Dialect::V1,
            w: Writer::new(),
            count: 0,
        }
    }

    pub fn v2() -> Self {
        Stream {
            dialect: Dialect::V2,
            w: Writer::new(),
            count: 0,
        }
    }

    pub fn bytes(self) -> Vec<u8> {
        self.w.into_bytes().unwrap().to_vec()
    }

    /// One node; `body` writes everything after tag and id.
    pub fn node(&mut self, tag: u8, id: Uuid, body: impl FnOnce(&mut Writer)) -> u16 {
        if self.dialect == Dialect::V2 {
            self.w.begin_bytes();
        }
        self.w.push_u8(tag);
        self.w.push_uuid(&id);
        body(&mut self.w);
        if self.dialect == Dialect::V2 {
            self.w.end_bytes().unwrap();
        }
        self.count += 1;
        self.count - 1
    }

    fn type_info(w: &mut Writer, name: &str, schema_defined: bool, ancestors: Option<&[u16]>) {
        w.push_string(name).unwrap();
        w.push_u8(u8::from(schema_defined));
        if let Some(ancestors) = ancestors {
            w.push_u16(ancestors.len() as u16);
            for a in ancestors {
                w.push_u16(*a);
            }
        }
    }

    pub fn scalar(&mut self, kind: ScalarType) -> u16 {
        match self.dialect {
            Dialect::V1 => self.node(2, kind.id(), |_| {}),
            Dialect::V2 => self.node(3, kind.id(), |w| {
                Self::type_info(w, kind.name(), true, Some(&[]))
            }),
        }
    }

    /// Custom scalar: v1 points at its base, v2 lists ancestors.
    pub fn custom_scalar(&mut self, id: Uuid, name: &str, base: u16) -> u16 {
        match self.dialect {
            Dialect::V1 => self.node(3, id, |w| w.push_u16(base)),
            Dialect::V2 => self.node(3, id, |w| Self::type_info(w, name, true, Some(&[base]))),
        }
    }

    pub fn set(&mut self, id: Uuid, child: u16) -> u16 {
        self.node(0, id, |w| w.push_u16(child))
    }

    pub fn array(&mut self, id: Uuid, child: u16) -> u16 {
        let v2 = self.dialect == Dialect::V2;
        self.node(6, id, |w| {
            if v2 {
                Self::type_info(w, "array<anytype>", false, Some(&[]));
            }
            w.push_u16(child);
            w.push_u16(1);
            w.push_i32(-1);
        })
    }

    pub fn range(&mut self, id: Uuid, child: u16) -> u16 {
        let v2 = self.dialect == Dialect::V2;
        self.node(9, id, |w| {
            if v2 {
                Self::type_info(w, "range<anypoint>", false, Some(&[]));
            }
            w.push_u16(child);
        })
    }

    pub fn multirange(&mut self, id: Uuid, child: u16) -> u16 {
        self.node(12, id, |w| {
            Self::type_info(w, "multirange<anypoint>", false, Some(&[]));
            w.push_u16(child);
        })
    }

    pub fn tuple(&mut self, id: Uuid, children: &[u16]) -> u16 {
        let v2 = self.dialect == Dialect::V2;
        self.node(4, id, |w| {
            if v2 {
                Self::type_info(w, "tuple", false, Some(&[]));
            }
            w.push_u16(children.len() as u16);
            for c in children {
                w.push_u16(*c);
            }
        })
    }

    pub fn named_tuple(&mut self, id: Uuid, elements: &[(&str, u16)]) -> u16 {
        let v2 = self.dialect == Dialect::V2;
        self.node(5, id, |w| {
            if v2 {
                Self::type_info(w, "tuple", false, Some(&[]));
            }
            Self::named(w, elements);
        })
    }

    pub fn sql_record(&mut self, id: Uuid, elements: &[(&str, u16)]) -> u16 {
        self.node(13, id, |w| Self::named(w, elements))
    }

    fn named(w: &mut Writer, elements: &[(&str, u16)]) {
        w.push_u16(elements.len() as u16);
        for (name, ty) in elements {
            w.push_string(name).unwrap();
            w.push_u16(*ty);
        }
    }

    pub fn enumeration(&mut self, id: Uuid, name: &str, members: &[&str]) -> u16 {
        let v2 = self.dialect == Dialect::V2;
        self.node(7, id, |w| {
            if v2 {
                Self::type_info(w, name, true, Some(&[]));
            }
            w.push_u16(members.len() as u16);
            for m in members {
                w.push_string(m).unwrap();
            }
        })
    }

    pub fn object_type(&mut self, id: Uuid, name: &str) -> u16 {
        self.node(10, id, |w| Self::type_info(w, name, true, None))
    }

    pub fn compound(&mut self, id: Uuid, name: &str, op: u8, children: &[u16]) -> u16 {
        self.node(11, id, |w| {
            Self::type_info(w, name, false, None);
            w.push_u8(op);
            w.push_u16(children.len() as u16);
            for c in children {
                w.push_u16(*c);
            }
        })
    }

    /// Output object shape. `object_type` is required in v2 and ignored in v1.
    pub fn shape(&mut self, id: Uuid, object_type: u16, elements: &[Elem<'_>]) -> u16 {
        let v2 = self.dialect == Dialect::V2;
        self.node(1, id, |w| {
            if v2 {
                w.push_u8(0);
                w.push_u16(object_type);
            }
            Self::elements(w, elements, v2.then_some(object_type));
        })
    }

    pub fn input_shape(&mut self, id: Uuid, elements: &[Elem<'_>]) -> u16 {
        self.node(8, id, |w| Self::elements(w, elements, None))
    }

    fn elements(w: &mut Writer, elements: &[Elem<'_>], source_type: Option<u16>) {
        w.push_u16(elements.len() as u16);
        for e in elements {
            w.push_u32(e.flags);
            w.push_u8(e.card);
            w.push_string(e.name).unwrap();
            w.push_u16(e.ty);
            if let Some(source) = source_type {
                w.push_u16(source);
            }
        }
    }

    pub fn annotation(&mut self, tag: u8, payload: &str) -> u16 {
        self.node(tag, id(0xa0), |w| w.push_string(payload).unwrap())
    }
}
