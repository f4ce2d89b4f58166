/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fs;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use prettytable::{row, Table};

use passes::{
    qr_render, CardSide, FormConfig, PassForm, PassStore, QrCodeType, QrField, QrPayloadMode,
    SavedPasses,
};

#[derive(Debug, Parser)]
#[command(about = "Digital pass wallet CLI", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action)]
    verbose: bool,

    /// Path to the pass database
    #[arg(short, long, default_value = "./passes.db")]
    database: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a new pass and save it
    Add {
        /// Pass title (required for submit)
        #[arg(long)]
        title: String,
        /// Issuing organization (required for submit)
        #[arg(long)]
        issuer: String,
        #[arg(long, default_value = "")]
        card_number: String,
        #[arg(long, default_value = "")]
        expiration_date: String,
        #[arg(long, default_value = "")]
        cardholder_name: String,
        #[arg(long, default_value = "")]
        cvv: String,
        #[arg(long, default_value = "")]
        additional_info: String,
        /// Accept the privacy agreement
        #[arg(long, action)]
        agree_privacy: bool,
        /// Render an embellished PNG QR code alongside the standard one
        #[arg(long, action)]
        pretty: bool,
        /// Encode each field into the QR payload instead of the default subset.
        /// May be repeated; valid names: title, cardNumber, expirationDate,
        /// cardholderName, cvv, issuerName
        #[arg(long = "qr-field")]
        qr_fields: Vec<String>,
        /// Card front scan image (PNG/JPEG, at least 300x300)
        #[arg(long)]
        front_image: Option<String>,
        /// Card back scan image (PNG/JPEG, at least 300x300)
        #[arg(long)]
        back_image: Option<String>,
    },
    /// List saved passes
    List,
    /// Print one saved pass as JSON
    Show { index: usize },
    /// Delete a saved pass by its position in the list
    Delete { index: usize },
    /// Export the QR code of a saved pass: the stored pretty PNG data URL
    /// when the pass has one, otherwise a standard SVG re-render
    Qr {
        index: usize,
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        out: Option<String>,
        /// Re-render the standard SVG even if a pretty image is stored
        #[arg(long, action)]
        standard: bool,
    },
    /// Delete every saved pass
    Wipe,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    log::debug!("using pass database at {}", cli.database);
    let store = PassStore::new(&cli.database)?;
    match cli.command {
        Commands::Add {
            title,
            issuer,
            card_number,
            expiration_date,
            cardholder_name,
            cvv,
            additional_info,
            agree_privacy,
            pretty,
            qr_fields,
            front_image,
            back_image,
        } => {
            let mut form = PassForm::new(FormConfig {
                qr_payload_mode: if qr_fields.is_empty() {
                    QrPayloadMode::FixedSubset
                } else {
                    QrPayloadMode::Selected
                },
                ..FormConfig::default()
            });
            form.fields.title = title;
            form.fields.issuer_name = issuer;
            form.fields.card_number = card_number;
            form.fields.expiration_date = expiration_date;
            form.fields.cardholder_name = cardholder_name;
            form.fields.cvv = cvv;
            form.fields.additional_info = additional_info;
            form.privacy_agreed = agree_privacy;
            if pretty {
                form.qr_code_type = QrCodeType::Pretty;
            }
            for name in qr_fields {
                form.selected_qr_fields.set(parse_qr_field(&name)?, true);
            }
            if let Some(path) = front_image {
                attach_image(&mut form, CardSide::Front, &path)?;
            }
            if let Some(path) = back_image {
                attach_image(&mut form, CardSide::Back, &path)?;
            }
            let record = form.submit(&store)?;
            log::info!("saved pass {} at {}", record.guid, record.time_created);
            println!("Saved pass: {} ({})", record.title, record.guid);
        }
        Commands::List => {
            let view = SavedPasses::load(&store)?;
            if view.is_empty() {
                println!("No saved passes");
            } else {
                let mut table = Table::new();
                table.add_row(row!["#", "Title", "Issuer", "Card number", "Expires", "QR"]);
                for (index, pass) in view.passes().iter().enumerate() {
                    table.add_row(row![
                        index,
                        pass.title,
                        pass.issuer_name,
                        pass.card_number,
                        pass.expiration_date,
                        if pass.pretty_qr_code_data.is_some() {
                            "pretty"
                        } else {
                            "standard"
                        },
                    ]);
                }
                table.printstd();
            }
        }
        Commands::Show { index } => {
            let view = SavedPasses::load(&store)?;
            let Some(pass) = view.passes().get(index) else {
                bail!("no pass at index {index}");
            };
            println!("{}", serde_json::to_string_pretty(pass)?);
        }
        Commands::Delete { index } => {
            let before = store.count()?;
            store.delete(index)?;
            if store.count()? < before {
                println!("Deleted pass {index}");
            } else {
                println!("No pass at index {index}");
            }
        }
        Commands::Qr {
            index,
            out,
            standard,
        } => {
            let view = SavedPasses::load(&store)?;
            let Some(pass) = view.passes().get(index) else {
                bail!("no pass at index {index}");
            };
            let rendered = match &pass.pretty_qr_code_data {
                Some(data_url) if !standard => data_url.clone(),
                _ => qr_render::render_standard(
                    &pass.qr_code_data,
                    &pass.text_color,
                    &pass.background_color,
                )?,
            };
            match out {
                Some(path) => {
                    fs::write(&path, rendered).with_context(|| format!("writing {path}"))?;
                    println!("Wrote {path}");
                }
                None => println!("{rendered}"),
            }
        }
        Commands::Wipe => {
            store.wipe()?;
            println!("Deleted all saved passes");
        }
    }
    Ok(())
}

fn init_logging(cli: &Cli) {
    let log_filter = if cli.verbose {
        "passes=trace,passes_cli=trace"
    } else {
        "passes=info,passes_cli=info"
    };
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", log_filter));
}

fn parse_qr_field(name: &str) -> Result<QrField> {
    QrField::ALL
        .into_iter()
        .find(|f| f.key() == name)
        .with_context(|| format!("unknown QR field {name:?}"))
}

fn attach_image(form: &mut PassForm, side: CardSide, path: &str) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("reading {path}"))?;
    log::debug!("read {} bytes from {}", bytes.len(), path);
    form.set_card_image(side, bytes)
        .with_context(|| format!("rejected image {path}"))?;
    Ok(())
}
