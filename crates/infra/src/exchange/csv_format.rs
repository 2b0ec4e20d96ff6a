use csv::{ReaderBuilder, Trim, WriterBuilder};

use stockledger_inventory::{ImportRecord, Product};

use super::ExchangeError;

const BOM: &str = "\u{feff}";

pub const EXPORT_HEADER: [&str; 8] = [
    "SKU",
    "Name",
    "Description",
    "Quantity",
    "MinStock",
    "Status",
    "CreatedAt",
    "UpdatedAt",
];

/// Rows read from an import file. Rows with no usable field are counted, not returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvImport {
    pub records: Vec<ImportRecord>,
    pub blank_rows: usize,
}

/// UTF-8 CSV with a leading byte-order mark so spreadsheet tools pick the right encoding.
pub fn export_products_csv(products: &[Product]) -> Result<Vec<u8>, ExchangeError> {
    let mut writer = WriterBuilder::new().from_writer(BOM.as_bytes().to_vec());
    writer.write_record(EXPORT_HEADER)?;

    for p in products {
        writer.write_record([
            p.sku().to_string(),
            p.name().to_string(),
            p.description().to_string(),
            p.quantity().to_string(),
            p.min_stock().to_string(),
            p.status().label().to_string(),
            p.created_at().to_rfc3339(),
            p.updated_at().to_rfc3339(),
        ])?;
    }

    writer.flush()?;
    writer.into_inner().map_err(|e| ExchangeError::Io(e.into_error()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Sku,
    Name,
    Description,
    Quantity,
    MinStock,
}

/// Trim, lowercase, collapse whitespace to `_`, drop anything outside `[a-z0-9_]`.
fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

fn column_for(header: &str) -> Option<Column> {
    match normalize_header(header).as_str() {
        "sku" => Some(Column::Sku),
        "name" | "product_name" => Some(Column::Name),
        "description" => Some(Column::Description),
        "quantity" | "qty" => Some(Column::Quantity),
        "minstock" | "min_stock" | "minimum_stock" => Some(Column::MinStock),
        _ => None,
    }
}

/// Header-driven parse. Unknown columns are ignored; missing cells are absent fields.
pub fn import_products_csv(text: &str) -> Result<CsvImport, ExchangeError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    if text.trim().is_empty() {
        return Err(ExchangeError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let columns: Vec<Option<Column>> = reader.headers()?.iter().map(column_for).collect();
    if columns.iter().all(Option::is_none) {
        return Err(ExchangeError::UnrecognisedHeader);
    }

    let mut import = CsvImport::default();
    for row in reader.records() {
        let row = row?;
        let mut record = ImportRecord::default();

        for (column, value) in columns.iter().zip(row.iter()) {
            let slot = match column {
                Some(Column::Sku) => &mut record.sku,
                Some(Column::Name) => &mut record.name,
                Some(Column::Description) => &mut record.description,
                Some(Column::Quantity) => &mut record.quantity,
                Some(Column::MinStock) => &mut record.min_stock,
                None => continue,
            };
            // First matching column wins when a file carries aliases twice.
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.to_string());
            }
        }

        if record.is_blank() {
            import.blank_rows += 1;
        } else {
            import.records.push(record);
        }
    }

    Ok(import)
}
