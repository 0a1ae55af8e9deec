//! Schema command - print the registered collection schemas

use color_eyre::eyre::Result;
use examnotes_core::{CollectionRegistry, CollectionSchema, schema::Presence};

/// Run the schema command.
pub fn run() -> Result<()> {
    let registry = CollectionRegistry::standard();
    for schema in registry.iter() {
        print!("{}", render(schema));
    }
    Ok(())
}

/// Render one schema as an aligned field table.
fn render(schema: &CollectionSchema) -> String {
    let mut out = format!("{}\n", schema.name());
    for field in schema.fields() {
        let presence = match &field.presence {
            Presence::Required => "required".to_string(),
            Presence::Optional => "optional".to_string(),
            Presence::Defaulted(value) => format!("optional, default {value}"),
        };
        out.push_str(&format!(
            "  {:<12} {:<20} {presence}\n",
            field.name,
            field.field_type.to_string()
        ));
    }
    out
}
