//! The in-memory catalog store.
//!
//! A [`Catalog`] holds the four entity collections and every lookup index
//! built over them. It is constructed wholesale from the raw sources and
//! never mutated afterwards; a reload builds a fresh catalog and swaps it in
//! atomically. [`CatalogCell`] provides the build-once, reuse-everywhere
//! lifecycle for callers that hold the catalog across queries.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::config::Config;
use crate::models::{
    CollectionReport, LoadReport, Model, Part, ResolvedLink, Schematic, SchematicPartLink,
};
use crate::normalize::{clean_str, coerce_int, coerce_price, norm_key};
use crate::records::{parse_auto, Record};
use crate::source::{fetch_all, DataSource, RawSources};

/// Immutable catalog: entity collections plus all derived indexes.
#[derive(Debug)]
pub struct Catalog {
    models: Vec<Model>,
    schematics: Vec<Schematic>,
    links: Vec<SchematicPartLink>,
    parts: Vec<Part>,

    model_by_id: HashMap<String, usize>,
    /// Normalized model number and normalized id both key here.
    model_by_key: HashMap<String, usize>,
    schematic_by_id: HashMap<String, usize>,
    /// Schematic indices per owning model id, sorted by (order, id).
    schematics_by_model: HashMap<String, Vec<usize>>,
    /// Link indices per schematic id, sorted by (order, diagram_no, part_id).
    links_by_schematic: HashMap<String, Vec<usize>>,
    part_by_id: HashMap<String, usize>,
    part_by_norm_id: HashMap<String, usize>,
    part_by_norm_number: HashMap<String, usize>,

    report: LoadReport,
}

/// First non-empty value among alternative canonical field spellings.
fn first_field<'a>(record: &'a Record, keys: &[&str]) -> &'a str {
    keys.iter()
        .map(|k| record.get(k))
        .find(|v| !v.is_empty())
        .unwrap_or("")
}

impl Catalog {
    /// Build a catalog from the four raw documents. Rows failing entity
    /// invariants are dropped silently; the returned report is the only
    /// place those discards are visible.
    pub fn build(raw: &RawSources) -> Self {
        let mut report = LoadReport::default();

        let models = build_models(&parse_auto(&raw.models), &mut report.models);
        let schematics = build_schematics(&parse_auto(&raw.schematics), &mut report.schematics);
        let links = build_links(&parse_auto(&raw.links), &mut report.links);
        let parts = build_parts(&parse_auto(&raw.parts), &mut report.parts);

        let mut model_by_id = HashMap::new();
        let mut model_by_key = HashMap::new();
        let mut number_keys = HashMap::new();
        for (i, model) in models.iter().enumerate() {
            if !model.id.is_empty() {
                model_by_id.entry(model.id.clone()).or_insert(i);
                model_by_key.entry(norm_key(&model.id)).or_insert(i);
            }
            if !model.model_number.is_empty() {
                number_keys.entry(norm_key(&model.model_number)).or_insert(i);
            }
        }
        // Duplicate keys resolve by row order (first wins) within each
        // class; a model number always beats an id alias spelling the same.
        for (key, i) in number_keys {
            model_by_key.insert(key, i);
        }

        let mut schematic_by_id = HashMap::new();
        let mut schematics_by_model: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, schematic) in schematics.iter().enumerate() {
            schematic_by_id.entry(schematic.id.clone()).or_insert(i);
            schematics_by_model
                .entry(schematic.model_id.clone())
                .or_default()
                .push(i);
        }
        for indices in schematics_by_model.values_mut() {
            indices.sort_by(|&a, &b| {
                schematics[a]
                    .order
                    .cmp(&schematics[b].order)
                    .then_with(|| schematics[a].id.cmp(&schematics[b].id))
            });
        }

        let mut links_by_schematic: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, link) in links.iter().enumerate() {
            links_by_schematic
                .entry(link.schematic_id.clone())
                .or_default()
                .push(i);
        }
        for indices in links_by_schematic.values_mut() {
            indices.sort_by(|&a, &b| {
                links[a]
                    .order
                    .cmp(&links[b].order)
                    .then_with(|| links[a].diagram_no.cmp(&links[b].diagram_no))
                    .then_with(|| links[a].part_id.cmp(&links[b].part_id))
            });
        }

        let mut part_by_id = HashMap::new();
        let mut part_by_norm_id = HashMap::new();
        let mut part_by_norm_number = HashMap::new();
        for (i, part) in parts.iter().enumerate() {
            if !part.id.is_empty() {
                part_by_id.entry(part.id.clone()).or_insert(i);
                part_by_norm_id.entry(norm_key(&part.id)).or_insert(i);
            }
            if !part.number.is_empty() {
                part_by_norm_number.entry(norm_key(&part.number)).or_insert(i);
            }
        }

        Self {
            models,
            schematics,
            links,
            parts,
            model_by_id,
            model_by_key,
            schematic_by_id,
            schematics_by_model,
            links_by_schematic,
            part_by_id,
            part_by_norm_id,
            part_by_norm_number,
            report,
        }
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn schematics(&self) -> &[Schematic] {
        &self.schematics
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn model_by_id(&self, id: &str) -> Option<&Model> {
        self.model_by_id.get(id).map(|&i| &self.models[i])
    }

    /// Look up a model by model number or id alias, separator- and
    /// case-insensitively.
    pub fn model_by_query(&self, query: &str) -> Option<&Model> {
        self.model_by_key
            .get(&norm_key(query))
            .map(|&i| &self.models[i])
    }

    pub fn schematic_by_id(&self, id: &str) -> Option<&Schematic> {
        self.schematic_by_id.get(id).map(|&i| &self.schematics[i])
    }

    /// Schematics belonging to a model, sorted by (order, id).
    pub fn schematics_for_model(&self, model_id: &str) -> Vec<&Schematic> {
        self.schematics_by_model
            .get(model_id)
            .map(|indices| indices.iter().map(|&i| &self.schematics[i]).collect())
            .unwrap_or_default()
    }

    /// Link rows for a schematic joined to their parts, sorted by
    /// (order, diagram_no, part_id). Links whose part cannot be resolved are
    /// kept with an absent part; a broken join row must not hide the rest of
    /// the diagram.
    pub fn parts_for_schematic(&self, schematic_id: &str) -> Vec<ResolvedLink<'_>> {
        self.links_by_schematic
            .get(schematic_id)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| {
                        let link = &self.links[i];
                        ResolvedLink {
                            link,
                            part: self.part_lookup(&link.part_id),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up a part by exact id, then normalized id, then normalized
    /// number. The exact-id pass keeps case-sensitive ids unambiguous when
    /// two ids differ only in case.
    pub fn part_by_query(&self, query: &str) -> Option<&Part> {
        if let Some(&i) = self.part_by_id.get(query) {
            return Some(&self.parts[i]);
        }
        let key = norm_key(query);
        if let Some(&i) = self.part_by_norm_id.get(&key) {
            return Some(&self.parts[i]);
        }
        self.part_by_norm_number.get(&key).map(|&i| &self.parts[i])
    }

    fn part_lookup(&self, part_id: &str) -> Option<&Part> {
        self.part_by_id
            .get(part_id)
            .or_else(|| self.part_by_norm_id.get(&norm_key(part_id)))
            .map(|&i| &self.parts[i])
    }
}

fn build_models(records: &[Record], report: &mut CollectionReport) -> Vec<Model> {
    let mut out = Vec::new();
    for record in records {
        report.rows += 1;
        let id = clean_str(first_field(record, &["id", "modelid"]));
        let model_number = clean_str(first_field(record, &["modelnumber", "model"]));
        if id.is_empty() && model_number.is_empty() {
            continue;
        }
        report.kept += 1;
        out.push(Model {
            id,
            brand: clean_str(record.get("brand")),
            model_number,
        });
    }
    out
}

fn build_schematics(records: &[Record], report: &mut CollectionReport) -> Vec<Schematic> {
    let mut out = Vec::new();
    for record in records {
        report.rows += 1;
        let id = clean_str(first_field(record, &["id", "schematicid"]));
        let model_id = clean_str(record.get("modelid"));
        if id.is_empty() || model_id.is_empty() {
            continue;
        }
        report.kept += 1;
        out.push(Schematic {
            id,
            model_id,
            name: clean_str(record.get("name")),
            order: coerce_int(record.get("order")),
            image: clean_str(first_field(record, &["image", "img"])),
        });
    }
    out
}

fn build_links(records: &[Record], report: &mut CollectionReport) -> Vec<SchematicPartLink> {
    let mut out = Vec::new();
    for record in records {
        report.rows += 1;
        let schematic_id = clean_str(record.get("schematicid"));
        let part_id = clean_str(record.get("partid"));
        if schematic_id.is_empty() || part_id.is_empty() {
            continue;
        }
        report.kept += 1;
        out.push(SchematicPartLink {
            schematic_id,
            diagram_no: coerce_int(first_field(record, &["diagramno", "diagramnumber"])),
            order: coerce_int(record.get("order")),
            part_id,
        });
    }
    out
}

fn build_parts(records: &[Record], report: &mut CollectionReport) -> Vec<Part> {
    let mut out = Vec::new();
    for record in records {
        report.rows += 1;
        let id = clean_str(first_field(record, &["id", "partid"]));
        let mut number = clean_str(first_field(record, &["number", "partnumber"]));
        if id.is_empty() && number.is_empty() {
            continue;
        }
        if number.is_empty() {
            number = id.clone();
        }
        report.kept += 1;
        out.push(Part {
            id,
            number,
            manufacturer: clean_str(record.get("manufacturer")),
            name: clean_str(record.get("name")),
            description: clean_str(record.get("description")),
            product_status: clean_str(first_field(record, &["productstatus", "status"])),
            inventory: coerce_int(record.get("inventory")),
            price: coerce_price(record.get("price")),
        });
    }
    out
}

/// Build-once, reuse-everywhere holder for the catalog.
///
/// The first `load` fetches and builds; later calls return the cached
/// catalog. `reload` always rebuilds and installs the new catalog in one
/// swap, so readers see either the old structure or the new one, never a
/// half-built mix. A failed fetch leaves the previous catalog in place.
#[derive(Default)]
pub struct CatalogCell {
    inner: RwLock<Option<Arc<Catalog>>>,
}

impl CatalogCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(
        &self,
        source: &dyn DataSource,
        config: &Config,
    ) -> Result<Arc<Catalog>> {
        if let Some(catalog) = self.cached() {
            return Ok(catalog);
        }
        self.reload(source, config).await
    }

    pub async fn reload(
        &self,
        source: &dyn DataSource,
        config: &Config,
    ) -> Result<Arc<Catalog>> {
        let raw = fetch_all(source, &config.data).await?;
        let catalog = Arc::new(Catalog::build(&raw));
        *self.inner.write().expect("catalog lock poisoned") = Some(catalog.clone());
        Ok(catalog)
    }

    fn cached(&self) -> Option<Arc<Catalog>> {
        self.inner.read().expect("catalog lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(models: &str, schematics: &str, links: &str, parts: &str) -> RawSources {
        RawSources {
            models: models.to_string(),
            schematics: schematics.to_string(),
            links: links.to_string(),
            parts: parts.to_string(),
        }
    }

    fn sample() -> RawSources {
        raw(
            "id,brand,modelNumber\nM1,Acme,ACM-100\nM2,Acme,ACM-200\n,,\n",
            "id,modelId,name,order,image\nS2,M1,Door,2,door.png\nS1,M1,Base,1,base.png\nSX,,Orphan,1,x.png\n",
            "schematicId,diagramNo,order,partId\nS1,3,2,P2\nS1,1,1,P1\nS1,2,1,P9\n",
            "id,number,manufacturer,name,description,productStatus,inventory,price\n\
             P1,WB-100,Acme,Hinge,Steel hinge,active,4,12.50\n\
             P2,,Acme,Gasket,Door gasket,active,0,$5.00\n",
        )
    }

    #[test]
    fn test_discard_rules() {
        let catalog = Catalog::build(&sample());
        assert_eq!(catalog.models().len(), 2);
        // SX has no modelId and is discarded
        assert_eq!(catalog.schematics().len(), 2);
        assert_eq!(catalog.report().schematics.discarded(), 1);
        assert_eq!(catalog.report().models.kept, 2);
    }

    #[test]
    fn test_model_lookup_by_number_and_id_alias() {
        let catalog = Catalog::build(&sample());
        assert_eq!(catalog.model_by_query("acm-100").unwrap().id, "M1");
        assert_eq!(catalog.model_by_query("ACM 200").unwrap().id, "M2");
        assert_eq!(catalog.model_by_query("m1").unwrap().id, "M1");
        assert!(catalog.model_by_query("ACM-999").is_none());
    }

    #[test]
    fn test_schematics_sorted_by_order_then_id() {
        let catalog = Catalog::build(&sample());
        let sorted: Vec<&str> = catalog
            .schematics_for_model("M1")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(sorted, ["S1", "S2"]);
    }

    #[test]
    fn test_links_sorted_and_joined() {
        let catalog = Catalog::build(&sample());
        let rows = catalog.parts_for_schematic("S1");
        let order: Vec<&str> = rows.iter().map(|r| r.link.part_id.as_str()).collect();
        // (order, diagram_no, part_id): P1 (1,1), P9 (1,2), P2 (2,3)
        assert_eq!(order, ["P1", "P9", "P2"]);
        assert!(rows[0].part.is_some());
        // P9 does not exist; the join row survives anyway
        assert!(rows[1].part.is_none());
    }

    #[test]
    fn test_part_number_falls_back_to_id() {
        let catalog = Catalog::build(&sample());
        let part = catalog.part_by_query("P2").unwrap();
        assert_eq!(part.number, "P2");
        assert_eq!(part.price, Some(5.0));
    }

    #[test]
    fn test_part_lookup_precedence() {
        let catalog = Catalog::build(&sample());
        assert_eq!(catalog.part_by_query("P1").unwrap().id, "P1");
        assert_eq!(catalog.part_by_query("p1").unwrap().id, "P1");
        assert_eq!(catalog.part_by_query("wb100").unwrap().id, "P1");
    }

    #[test]
    fn test_duplicate_model_keys_resolve_by_row_order() {
        // Two rows share the normalized number key; the first row wins.
        let catalog = Catalog::build(&raw(
            "id,brand,modelNumber\nM1,Acme,ACM-100\nM2,Acme,acm 100\n",
            "id,modelId\n",
            "schematicId,partId\n",
            "id\n",
        ));
        assert_eq!(catalog.model_by_query("ACM100").unwrap().id, "M1");
    }

    #[test]
    fn test_model_number_beats_id_alias() {
        // A later row's number collides with an earlier row's id; the
        // number still owns the key.
        let catalog = Catalog::build(&raw(
            "id,brand,modelNumber\nX1,Acme,ACM-1\nM2,Acme,X1\n",
            "id,modelId\n",
            "schematicId,partId\n",
            "id\n",
        ));
        assert_eq!(catalog.model_by_query("x1").unwrap().id, "M2");
        // The exact-id accessor is unaffected
        assert_eq!(catalog.model_by_id("X1").unwrap().model_number, "ACM-1");
    }

    #[test]
    fn test_identifier_preserved_verbatim() {
        let catalog = Catalog::build(&raw(
            "id,brand,modelNumber\n M1 ,Acme, ACM-100x \n",
            "id,modelId\n",
            "schematicId,partId\n",
            "id\n",
        ));
        let model = catalog.model_by_query("acm100X").unwrap();
        // Surrounding whitespace trimmed, inner characters untouched
        assert_eq!(model.model_number, "ACM-100x");
        assert_eq!(model.id, "M1");
    }

    #[test]
    fn test_mismatch_warning_for_empty_collection() {
        let catalog = Catalog::build(&raw(
            "identifier,brand\nX,Acme\n",
            "id,modelId\nS1,M1\n",
            "schematicId,partId\nS1,P1\n",
            "id\nP1\n",
        ));
        assert_eq!(catalog.report().mismatch_warnings(), vec!["models"]);
    }

    #[tokio::test]
    async fn test_cell_caches_and_reload_swaps() {
        let dir = tempfile::tempdir().unwrap();
        let write = |models: &str| {
            std::fs::write(dir.path().join("models.csv"), models).unwrap();
            std::fs::write(dir.path().join("schematics.csv"), "id,modelId\n").unwrap();
            std::fs::write(dir.path().join("schematic_parts.csv"), "schematicId,partId\n")
                .unwrap();
            std::fs::write(dir.path().join("parts.csv"), "id\n").unwrap();
        };
        write("id,brand,modelNumber\nM1,Acme,ACM-100\n");

        let config: Config = toml::from_str(&format!(
            "[data]\nroot = \"{}\"\n",
            dir.path().display()
        ))
        .unwrap();
        let source = crate::source::FsSource::new(dir.path().to_path_buf());
        let cell = CatalogCell::new();

        let first = cell.load(&source, &config).await.unwrap();
        assert!(first.model_by_query("ACM-100").is_some());

        // Changing the files does not affect the cached catalog
        write("id,brand,modelNumber\nM2,Acme,ACM-200\n");
        let cached = cell.load(&source, &config).await.unwrap();
        assert!(cached.model_by_query("ACM-100").is_some());

        // A reload swaps the structure wholesale
        let reloaded = cell.reload(&source, &config).await.unwrap();
        assert!(reloaded.model_by_query("ACM-100").is_none());
        assert!(reloaded.model_by_query("ACM-200").is_some());
    }
}
