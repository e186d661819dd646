//! JSON import/export of card batches.
//!
//! A batch is what a card source hands over: a collection name and the cards
//! generated for it. Importing registers every card; cards that already exist
//! are skipped. Exporting writes a collection's cards in the same format.

use crate::database::CardLedger;
use crate::error::Result;
use crate::models::NewCard;
use crate::scheduler::Scheduler;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardBatch {
    pub collection: String,
    pub cards: Vec<NewCard>,
}

pub fn read_batch(path: impl AsRef<Path>) -> Result<CardBatch> {
    let file = File::open(path.as_ref())?;
    let batch: CardBatch = serde_json::from_reader(BufReader::new(file))?;
    log::debug!(
        "Read {} card(s) for '{}' from {}",
        batch.cards.len(),
        batch.collection,
        path.as_ref().display()
    );
    Ok(batch)
}

pub fn write_batch(batch: &CardBatch, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(&mut writer, batch)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Registers every card of the batch for `user_id`.
///
/// `collection` overrides the batch's own collection name when given.
/// Returns the collection used and the number of newly registered cards.
pub fn import_batch(
    scheduler: &Scheduler,
    user_id: &str,
    path: impl AsRef<Path>,
    collection: Option<&str>,
) -> Result<(String, usize)> {
    let batch = read_batch(path)?;
    let collection = collection.unwrap_or(batch.collection.as_str()).to_string();
    let added = scheduler.register_cards(user_id, &collection, &batch.cards)?;
    Ok((collection, added))
}

/// Writes the current name and text of every card in a collection.
pub fn export_collection(
    ledger: &CardLedger,
    user_id: &str,
    collection_id: &str,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let cards: Vec<NewCard> = ledger
        .list_cards(user_id, collection_id)?
        .into_iter()
        .map(|snapshot| NewCard::new(snapshot.card_name, snapshot.card_text))
        .collect();
    let count = cards.len();
    write_batch(
        &CardBatch {
            collection: collection_id.to_string(),
            cards,
        },
        path,
    )?;
    Ok(count)
}
