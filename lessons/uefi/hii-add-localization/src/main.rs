//! # HII Add Localization
//!
//! Adds a French translation to the OVMF platform configuration package
//! list, which ships in English only, so the setup form can be shown in
//! `fr-FR`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use alloc::string::String;
use firmware_hii::strings::has_language;
use firmware_types::{Guid, guid};
use lesson_support::hii::handles_for_guid;
use lesson_support::protocols::{HiiDatabase, HiiHandle, HiiString};
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::println;

/// `PlatformDxe` formset package list in OVMF.
const PACKAGE_GUID: Guid = guid!("d9dcc5df-4007-435e-9098-8970935504b2");

const LANGUAGE: &str = "fr-FR";

/// Translations of string ids 2 and up.
const FRENCH_STRINGS: [&str; 39] = [
    "Configuration de la OVMF plateforme",
    "Modifier divers paramètres de la plateforme OVMF",
    "Paramètres OVMF",
    "Résolution préférée au prochain démarrage",
    "La résolution préférée de la console graphique au prochain démarrage. Il peut être non défini, ou même invalide (donc ignoré) wrt. la taille de la RAM vidéo.",
    "Modifier la résolution préférée pour le prochain démarrage",
    "Vous pouvez spécifier ici une nouvelle préférence pour la console graphique. La liste est filtrée en fonction de la taille de la RAM vidéo.",
    "Valider les modifications et quitter",
    "Annuler les changements et quitter",
    "640x480",
    "800x480",
    "800x600",
    "832x624",
    "960x640",
    "1024x600",
    "1024x768",
    "1152x864",
    "1152x870",
    "1280x720",
    "1280x760",
    "1280x768",
    "1280x800",
    "1280x960",
    "1280x1024",
    "1360x768",
    "1366x768",
    "1400x1050",
    "1440x900",
    "1600x900",
    "1600x1200",
    "1680x1050",
    "1920x1080",
    "1920x1200",
    "1920x1440",
    "2000x2000",
    "2048x1536",
    "2048x2048",
    "2560x1440",
    "2560x1600",
];

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let (db, strings) = match (
        lesson_support::locate::<HiiDatabase>(),
        lesson_support::locate::<HiiString>(),
    ) {
        (Ok(db), Ok(strings)) => (db, strings),
        (Err(status), _) | (_, Err(status)) => {
            error!("Can't locate HII protocols: {status}");
            return status;
        }
    };

    let handle = match handles_for_guid(&db, &PACKAGE_GUID).map(|h| h.first().copied()) {
        Ok(Some(handle)) => handle,
        Ok(None) => {
            println!("Error! No package list with GUID {PACKAGE_GUID}");
            return Status::NOT_FOUND;
        }
        Err(status) => {
            error!("Can't list HII package lists: {status}");
            return status;
        }
    };

    let languages = print_languages(&strings, handle);
    if !has_language(&languages, LANGUAGE)
        && let Err(status) = strings.new_string(handle, LANGUAGE, "French", "")
    {
        println!("Error! NewString fail: {status}");
        return status;
    }

    for (id, text) in (2u16..).zip(FRENCH_STRINGS) {
        if let Err(status) = strings.set_string(handle, id, LANGUAGE, text) {
            println!("Error! SetString fail for ID={id}: {status}");
        }
    }

    print_languages(&strings, handle);
    Status::SUCCESS
}

fn print_languages(strings: &HiiString, handle: HiiHandle) -> String {
    match strings.get_languages(handle) {
        Ok(languages) => {
            println!("{languages}");
            languages
        }
        Err(status) => {
            error!("Can't get package list languages: {status}");
            String::new()
        }
    }
}
