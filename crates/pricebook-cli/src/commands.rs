//! # Commands
//!
//! One function per subcommand. Each returns the JSON value `main` prints.
//!
//! ## Command Map
//! ```text
//! ┌────────────┬───────────────────────────────────────────────────────────┐
//! │ encode     │ BigInt + scale      → fixed digit (strict or --clamp)     │
//! │ decode     │ fixed digit         → amount + unit                       │
//! │ currency   │ code + raw amount   → { code, amount }                    │
//! │ currencies │                     → descriptor table                    │
//! │ range      │ "a..b"              → parsed boundaries                   │
//! │ query      │ listing params      → resolved plan (or results, --from)  │
//! │ convert    │ USD price           → prices in every currency            │
//! │ import     │ product file        → batch summary                       │
//! └────────────┴───────────────────────────────────────────────────────────┘
//! ```

use clap::Subcommand;
use num_bigint::BigInt;
use pricebook_core::currency::CURRENCIES;
use pricebook_core::fixed::to_fixed_digit_permissive;
use pricebook_core::import::{
    decode_csv_bytes, import_rows, read_csv, validate_csv_filename, ImportOutcome,
};
use pricebook_core::mapper::{
    map_product_price_resource, map_product_resource, serialize_currency,
};
use pricebook_core::number::parse_signed_digits;
use pricebook_core::query::{parse_amount_range, parse_date_range, ProductQuery};
use pricebook_core::{
    parse_precise_number, to_fixed_digit, CurrencyCode, CurrencyType, ImportStrategy,
    PreciseNumber, ProductBatch, ProductPrice, ValidationError,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Largest `--scale` accepted by `encode`, strict or clamped.
pub const MAX_SCALE: f64 = 1024.0;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render an integer amount in the smallest unit as a fixed digit string
    Encode {
        /// Signed integer amount, e.g. -7238
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Number of fractional digits (at most 1024)
        #[arg(long, allow_hyphen_values = true)]
        scale: f64,

        /// Clamp an invalid scale instead of failing
        #[arg(long)]
        clamp: bool,
    },

    /// Parse a fixed digit string into an amount and a unit
    Decode {
        #[arg(allow_hyphen_values = true)]
        fixed: String,
    },

    /// Render a raw amount at the scale of a currency
    Currency {
        /// Currency code (usd, eur, jpy, brl, btc)
        code: String,

        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// List supported currencies
    Currencies,

    /// Parse a range filter
    Range {
        /// Range text, e.g. 10.00..50.00
        #[arg(allow_hyphen_values = true)]
        text: String,

        /// Boundaries are RFC 3339 timestamps instead of amounts
        #[arg(long)]
        dates: bool,
    },

    /// Resolve product listing parameters
    Query {
        #[arg(long)]
        name: Option<String>,

        /// asc | desc
        #[arg(long)]
        ord: Option<String>,

        /// usd | eur | jpy | brl | btc | exp
        #[arg(long)]
        ordby: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        range: Option<String>,

        /// usd | eur | jpy | brl | btc
        #[arg(long)]
        rangeby: Option<String>,

        /// Run the query over the products of an import file
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Convert a USD price into every currency
    Convert {
        /// USD price, e.g. 163.88
        usd: String,
    },

    /// Parse a product file
    Import {
        file: PathBuf,

        /// atomic | partial
        #[arg(long, default_value = "atomic")]
        strategy: String,
    },
}

/// Runs one command.
pub fn run(command: Command, config: &CliConfig) -> CliResult<Value> {
    debug!(?command, "Running command");
    match command {
        Command::Encode { amount, scale, clamp } => encode(&amount, scale, clamp),
        Command::Decode { fixed } => decode(&fixed),
        Command::Currency { code, amount } => currency(&code, &amount),
        Command::Currencies => Ok(serde_json::to_value(CURRENCIES)?),
        Command::Range { text, dates } => range(&text, dates),
        Command::Query {
            name,
            ord,
            ordby,
            range,
            rangeby,
            from,
        } => {
            let pairs = [
                ("name", name),
                ("ord", ord),
                ("ordby", ordby),
                ("range", range),
                ("rangeby", rangeby),
            ];
            query(&pairs, from.as_deref(), config)
        }
        Command::Convert { usd } => convert(&usd, config),
        Command::Import { file, strategy } => import(&file, &strategy, config),
    }
}

fn parse_amount(amount: &str) -> CliResult<BigInt> {
    parse_signed_digits(amount).ok_or_else(|| {
        CliError::from(ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: "must be a signed integer".to_string(),
        })
    })
}

fn precise_json(number: &PreciseNumber) -> Value {
    json!({
        "amount": number.amount.to_string(),
        "unit": number.unit,
        "fixed": number.to_fixed_digit(),
    })
}

// =============================================================================
// Codec Commands
// =============================================================================

fn encode(amount: &str, scale: f64, clamp: bool) -> CliResult<Value> {
    if scale > MAX_SCALE {
        return Err(ValidationError::InvalidFormat {
            field: "scale".to_string(),
            reason: format!("must be at most {MAX_SCALE}"),
        }
        .into());
    }

    let amount = parse_amount(amount)?;
    let fixed = if clamp {
        to_fixed_digit_permissive(&amount, scale)
    } else {
        to_fixed_digit(&amount, scale)?
    };
    Ok(json!({ "fixed": fixed }))
}

fn decode(fixed: &str) -> CliResult<Value> {
    let number = parse_precise_number(fixed)?;
    Ok(precise_json(&number))
}

fn currency(code: &str, amount: &str) -> CliResult<Value> {
    let code: CurrencyCode = code.parse()?;
    let currency = CurrencyType::new(code, parse_amount(amount)?);
    Ok(serde_json::to_value(serialize_currency(&currency))?)
}

// =============================================================================
// Query Commands
// =============================================================================

fn range(text: &str, dates: bool) -> CliResult<Value> {
    if dates {
        let range = parse_date_range("range", text)?;
        return Ok(json!({
            "start": range.start.map(|date| date.to_rfc3339()),
            "end": range.end.map(|date| date.to_rfc3339()),
        }));
    }

    let range = parse_amount_range("range", text)?;
    Ok(json!({
        "start": range.start.as_ref().map(precise_json),
        "end": range.end.as_ref().map(precise_json),
    }))
}

fn query(
    pairs: &[(&str, Option<String>)],
    from: Option<&Path>,
    config: &CliConfig,
) -> CliResult<Value> {
    let query = ProductQuery::from_pairs(
        pairs
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|value| (*key, value))),
    )?;

    let Some(path) = from else {
        let range = query.range.as_ref().map(|filter| {
            json!({
                "column": filter.column().as_str(),
                "start": filter.range.start.as_ref().map(|start| start.amount.to_string()),
                "end": filter.range.end.as_ref().map(|end| end.amount.to_string()),
            })
        });
        return Ok(json!({
            "name": query.name,
            "range": range,
            "order_column": query.order_column.as_str(),
            "order": query.order,
        }));
    };

    let outcome = import_file(path, ImportStrategy::Partial, config)?;
    let products: Vec<Value> = query
        .execute(&outcome.products)
        .into_iter()
        .map(|product| serde_json::to_value(map_product_resource(product)))
        .collect::<Result<_, _>>()?;
    Ok(Value::Array(products))
}

// =============================================================================
// Catalog Commands
// =============================================================================

fn convert(usd: &str, config: &CliConfig) -> CliResult<Value> {
    let usd = parse_precise_number(usd)?;
    let prices = ProductPrice::from_usd(&usd, &config.exchange_rate()?);
    Ok(serde_json::to_value(map_product_price_resource(&prices))?)
}

fn import_file(
    path: &Path,
    strategy: ImportStrategy,
    config: &CliConfig,
) -> CliResult<ImportOutcome> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    validate_csv_filename(&filename)?;

    let rate = config.exchange_rate()?;
    let bytes = std::fs::read(path).map_err(|err| CliError::ReadFailed {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    let text = decode_csv_bytes(&bytes, strategy)?;

    let batch = ProductBatch::new(filename, strategy);
    info!(batch_id = %batch.id, %strategy, "Importing product file");
    Ok(import_rows(read_csv(&text)?, batch, &rate)?)
}

fn import(path: &Path, strategy: &str, config: &CliConfig) -> CliResult<Value> {
    let strategy: ImportStrategy = strategy.parse()?;
    let outcome = import_file(path, strategy, config)?;
    Ok(serde_json::to_value(outcome.summary())?)
}

// =============================================================================
// Unit Tests
// =============================================================================
