use std::fs;

const CONFIG_PATH: &str = "src/default_config.toml";

#[derive(Clone, Copy)]
enum Kind {
    String,
    Bool,
}

/// Every field `Config` accepts, by section.
const KNOWN_FIELDS: [(&str, &[(&str, Kind)]); 4] = [
    ("links", &[("color", Kind::String), ("underline", Kind::Bool)]),
    ("page", &[("numbers", Kind::Bool)]),
    ("font", &[("family", Kind::String)]),
    ("document", &[("title", Kind::String), ("subtitle", Kind::String)]),
];

fn main() {
    println!("cargo:rerun-if-changed={CONFIG_PATH}");

    let content = fs::read_to_string(CONFIG_PATH)
        .unwrap_or_else(|e| panic!("Failed to read {CONFIG_PATH}: {e}"));

    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid {CONFIG_PATH}: {e}"),
    };

    for (section, value) in &table {
        let Some((_, fields)) = KNOWN_FIELDS.iter().find(|(name, _)| *name == section.as_str()) else {
            panic!("Unknown section [{section}] in {CONFIG_PATH}");
        };
        let Some(entries) = value.as_table() else {
            panic!("[{section}] in {CONFIG_PATH} must be a table");
        };

        for (key, value) in entries {
            let Some((_, kind)) = fields.iter().find(|(name, _)| *name == key.as_str()) else {
                panic!("Unknown key {section}.{key} in {CONFIG_PATH}");
            };
            let ok = match kind {
                Kind::String => value.is_str(),
                Kind::Bool => value.is_bool(),
            };
            if !ok {
                panic!("{section}.{key} in {CONFIG_PATH} has the wrong type");
            }
        }
    }
}
