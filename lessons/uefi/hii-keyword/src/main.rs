//! # HII Keyword
//!
//! Reads and writes settings by keyword through
//! `EFI_CONFIG_KEYWORD_HANDLER_PROTOCOL`.
//!
//! ```text
//! HIIKeyword get <NamespaceStr> <KeywordStr>     "" matches everything
//! HIIKeyword set <KeywordStr>
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use firmware_hii::config::{ConfigRender, LongString, Progress};
use lesson_support::args::shell_args;
use lesson_support::device_path::text_of;
use lesson_support::protocols::ConfigKeywordHandler;
use lesson_support::protocols::keyword_handler::KeywordError;
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::println;

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let handler = match lesson_support::locate::<ConfigKeywordHandler>() {
        Ok(handler) => handler,
        Err(status) => {
            error!("Error! Can't locate gEfiConfigKeywordHandlerProtocolGuid: {status}");
            return status;
        }
    };

    let args = shell_args("HIIKeyword");
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = match args.as_slice() {
        [_] => {
            usage();
            Ok(())
        }
        [_, "get", namespace, keyword] => get(&handler, non_empty(namespace), non_empty(keyword)),
        [_, "set", keyword] => set(&handler, keyword),
        _ => {
            println!("Wrong argument!");
            usage();
            Err(Status::INVALID_PARAMETER)
        }
    };
    match result {
        Ok(()) => Status::SUCCESS,
        Err(status) => status,
    }
}

fn usage() {
    println!("Usage:");
    println!("HIIKeyword get <NamespaceStr> <KeywordStr>");
    println!("HIIKeyword set <KeywordStr>");
}

fn non_empty(arg: &str) -> Option<&str> {
    (!arg.is_empty()).then_some(arg)
}

fn report(request: &str, e: &KeywordError, call: &str) -> Status {
    let progress = Progress::new(request, e.progress);
    if !progress.is_complete() {
        println!("Part of string was unparsed {}", progress.unparsed());
    }
    if e.progress_err.is_error() {
        println!("Error! ProgressErr={}", e.progress_err);
    }
    println!("Error! {call} returned {}", e.status);
    e.status
}

fn get(
    handler: &ConfigKeywordHandler,
    namespace: Option<&str>,
    keyword: Option<&str>,
) -> Result<(), Status> {
    let response = handler
        .get_data(namespace, keyword)
        .map_err(|e| report(keyword.unwrap_or_default(), &e, "GetData"))?;
    println!("Response: {}\n", LongString::new(&response));
    println!("{}", ConfigRender::new(&response).with_path_text(text_of));
    Ok(())
}

fn set(handler: &ConfigKeywordHandler, keyword: &str) -> Result<(), Status> {
    handler
        .set_data(keyword)
        .map_err(|e| report(keyword, &e, "SetData"))
}
