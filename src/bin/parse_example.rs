use log::{info, warn};
use patent_xml::core::extract::{abstract_text, all_claims_text_formatted, claim_list, title};
use patent_xml::parse_xml;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let data_dir = Path::new("./data");
    if !data_dir.exists() {
        println!("No data/ directory found. Create ./data and place patent grant or application .xml files there.");
        return Ok(());
    }

    for entry in std::fs::read_dir(data_dir)? {
        let path = entry?.path();
        if path.extension().map_or(true, |ext| ext != "xml") {
            continue;
        }

        info!("Parsing {}", path.display());
        let bytes = std::fs::read(&path)?;
        let doc = match parse_xml(&bytes) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        println!("== {} ({})", title(&doc), doc.kind());
        println!("{}\n", abstract_text(&doc));
        println!("{}\n", all_claims_text_formatted(claim_list(&doc)));

        let summary = serde_json::json!({
            "file": path.display().to_string(),
            "kind": doc.kind(),
            "title": title(&doc),
            "claims": claim_list(&doc).len(),
            "published": doc.header().published_on(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
