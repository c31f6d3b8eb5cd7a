//! UDT example: attribute-wise codecs and the recursive wrap pass.
//!
//! Run with: cargo run --example udt

use std::any::TypeId;

use cql_named_bind::entity::{Entity, FieldMeta, FieldMut, RawField};
use cql_named_bind::value::IntoValue;
use cql_named_bind::{scan_as_entity, udt_from_value, Query, UdtCodec, Value};

/// UDT-marked composite; its wire form is a named tuple of attributes.
#[derive(Debug, Default, Clone, PartialEq)]
struct Coordinates {
    lat: f64,
    lon: f64,
}

impl Entity for Coordinates {
    fn meta(&self) -> &'static [FieldMeta] {
        static META: &[FieldMeta] = &[FieldMeta::scalar("lat"), FieldMeta::scalar("lon")];
        META
    }

    fn type_key(&self) -> TypeId {
        TypeId::of::<Coordinates>()
    }

    fn type_name(&self) -> &'static str {
        "Coordinates"
    }

    fn udt_marked(&self) -> bool {
        true
    }

    fn field(&self, index: usize) -> RawField<'_> {
        match index {
            0 => RawField::Scalar(self.lat.into_value()),
            _ => RawField::Scalar(self.lon.into_value()),
        }
    }

    fn field_mut(&mut self, index: usize) -> FieldMut<'_> {
        match index {
            0 => FieldMut::Scalar(&mut self.lat),
            _ => FieldMut::Scalar(&mut self.lon),
        }
    }
}

udt_from_value!(Coordinates);

#[derive(Debug, Default, Clone, PartialEq)]
struct Trip {
    id: i32,
    origin: Coordinates,
    stops: Vec<Coordinates>,
}

impl Entity for Trip {
    fn meta(&self) -> &'static [FieldMeta] {
        static META: &[FieldMeta] = &[
            FieldMeta::scalar("id"),
            FieldMeta::scalar("origin"),
            FieldMeta::scalar("stops"),
        ];
        META
    }

    fn type_key(&self) -> TypeId {
        TypeId::of::<Trip>()
    }

    fn type_name(&self) -> &'static str {
        "Trip"
    }

    fn field(&self, index: usize) -> RawField<'_> {
        match index {
            0 => RawField::Scalar(self.id.into_value()),
            1 => RawField::Struct(&self.origin),
            2 => RawField::List(
                self.stops
                    .iter()
                    .map(|c| RawField::Struct(c as &dyn Entity))
                    .collect(),
            ),
            _ => unreachable!(),
        }
    }

    fn field_mut(&mut self, index: usize) -> FieldMut<'_> {
        match index {
            0 => FieldMut::Scalar(&mut self.id),
            1 => FieldMut::Scalar(&mut self.origin),
            2 => FieldMut::Scalar(&mut self.stops),
            _ => unreachable!(),
        }
    }
}

scan_as_entity!(Trip);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    // Example 1: whole-value encode / decode
    println!("--- Example 1: Encoding a UDT ---");
    let codec = UdtCodec::new();
    let origin = Coordinates {
        lat: 52.52,
        lon: 13.405,
    };
    let wire = codec.encode(&origin)?;
    println!("wire form: {wire:?}");

    let mut decoded = Coordinates::default();
    codec.decode(&mut decoded, wire)?;
    assert_eq!(decoded, origin);
    println!("round-tripped: {decoded:?}");

    // Example 2: single attributes
    println!("\n--- Example 2: Attribute access ---");
    println!("lat = {:?}", codec.marshal_attr(&origin, "lat")?);
    let mut patched = Coordinates::default();
    codec.unmarshal_attr(&mut patched, "lon", Value::Double(2.35))?;
    println!("patched: {patched:?}");

    // Example 3: binding a struct with UDT fields wraps them recursively
    println!("\n--- Example 3: The wrap pass during binding ---");
    let trip = Trip {
        id: 7,
        origin,
        stops: vec![
            Coordinates {
                lat: 48.85,
                lon: 2.35,
            },
            Coordinates {
                lat: 41.9,
                lon: 12.5,
            },
        ],
    };
    let insert = Query::new("INSERT INTO trips (id, origin, stops) VALUES (:id, :origin, :stops)")?;
    for (name, value) in insert.names().iter().zip(insert.bind_struct(&trip)?) {
        println!("  {name} => {value:?}");
    }

    println!("\nExample completed successfully!");
    Ok(())
}
