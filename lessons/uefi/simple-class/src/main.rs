//! # Simple Class
//!
//! Publishes a tiny protocol of our own that keeps a number, consumes it
//! through the handle database and watches its installation with a protocol
//! notify event. Everything is torn down again before the image exits, as an
//! application's code does not outlive it.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]

use core::ffi::c_void;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};
use log::{LevelFilter, error, warn};
use uefi::boot::{self, EventType, Tpl};
use uefi::prelude::*;
use uefi::proto::unsafe_protocol;
use uefi::{Event, Handle, Identify, println};

/// The function table handed to the handle database.
#[repr(C)]
#[unsafe_protocol("b5510eea-6f11-4e4b-ad0f-35ce17bd7a67")]
struct SimpleClass {
    get_number: unsafe extern "efiapi" fn(number: *mut usize) -> Status,
    set_number: extern "efiapi" fn(number: usize) -> Status,
}

impl SimpleClass {
    fn number(&self) -> Result<usize, Status> {
        let mut number = 0;
        unsafe { (self.get_number)(&raw mut number) }
            .to_result()
            .map_err(|e| e.status())?;
        Ok(number)
    }

    fn set(&self, number: usize) -> Result<(), Status> {
        (self.set_number)(number).to_result().map_err(|e| e.status())
    }

    /// Adds 5 to the stored number.
    fn bump(&self) -> Result<usize, Status> {
        let number = self.number()?;
        self.set(number + 5)?;
        Ok(number)
    }
}

static NUMBER: AtomicUsize = AtomicUsize::new(0);
static NOTIFY_COUNT: AtomicUsize = AtomicUsize::new(0);

unsafe extern "efiapi" fn get_number(number: *mut usize) -> Status {
    if number.is_null() {
        return Status::INVALID_PARAMETER;
    }
    unsafe { number.write(NUMBER.load(Ordering::Relaxed)) };
    Status::SUCCESS
}

extern "efiapi" fn set_number(number: usize) -> Status {
    NUMBER.store(number, Ordering::Relaxed);
    Status::SUCCESS
}

static INTERFACE: SimpleClass = SimpleClass {
    get_number,
    set_number,
};

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let event = match watch_installs() {
        Ok(event) => event,
        Err(status) => return status,
    };

    let status = match install() {
        Ok(handle) => {
            let status = consume();
            uninstall(handle);
            status
        }
        Err(status) => status,
    };

    if let Err(e) = boot::close_event(event) {
        warn!("Can't close the notify event: {}", e.status());
    }
    status
}

/// Signals [`on_install`] whenever a `SimpleClass` interface is installed.
fn watch_installs() -> Result<Event, Status> {
    let context = NonNull::from(&NOTIFY_COUNT).cast::<c_void>();
    // SAFETY: the notify function only touches statics and boot services.
    let event = unsafe {
        boot::create_event(
            EventType::NOTIFY_SIGNAL,
            Tpl::NOTIFY,
            Some(on_install),
            Some(context),
        )
    }
    .map_err(|e| {
        println!("Error! CreateEvent returned: {}", e.status());
        e.status()
    })?;

    if let Err(e) = boot::register_protocol_notify(&SimpleClass::GUID, &event) {
        println!("Error! RegisterProtocolNotify returned: {}", e.status());
        if let Err(e) = boot::close_event(event) {
            warn!("Can't close the notify event: {}", e.status());
        }
        return Err(e.status());
    }
    Ok(event)
}

unsafe extern "efiapi" fn on_install(_event: Event, context: Option<NonNull<c_void>>) {
    let Some(context) = context else {
        return;
    };
    // SAFETY: the context registered in `watch_installs` is NOTIFY_COUNT.
    let count = unsafe { context.cast::<AtomicUsize>().as_ref() };
    println!(
        "\nEvent is signaled! Context = {}",
        count.fetch_add(1, Ordering::Relaxed)
    );

    let Some(handle) = lesson_support::handles::<SimpleClass>()
        .ok()
        .and_then(|handles| handles.first().copied())
    else {
        println!("Error! LocateProtocol returned: {}", Status::NOT_FOUND);
        return;
    };
    match lesson_support::open_shared::<SimpleClass>(handle).and_then(|sc| sc.bump()) {
        Ok(number) => println!("Current number = {number}"),
        Err(status) => println!("Error! Can't update number: {status}"),
    }
}

fn install() -> Result<Handle, Status> {
    println!("Hello from SimpleClassProtocol driver");
    // SAFETY: INTERFACE is a static and is uninstalled before the image exits.
    let handle = unsafe {
        boot::install_protocol_interface(
            None,
            &SimpleClass::GUID,
            (&raw const INTERFACE).cast::<c_void>(),
        )
    }
    .map_err(|e| {
        println!("Error! InstallProtocolInterface returned: {}", e.status());
        e.status()
    })?;
    println!("Installed on handle={:p}", handle.as_ptr());
    Ok(handle)
}

fn consume() -> Status {
    let handles = match lesson_support::handles::<SimpleClass>() {
        Ok(handles) => handles,
        Err(status) => {
            println!("Error! Can't find any handle with SimpleClass protocol: {status}");
            return status;
        }
    };

    for handle in handles {
        println!("Handle = {:p}", handle.as_ptr());
        let simple_class = match lesson_support::open_shared::<SimpleClass>(handle) {
            Ok(simple_class) => simple_class,
            Err(status) => {
                println!("Error! Can't open SimpleClass protocol: {status}");
                continue;
            }
        };
        match simple_class.bump() {
            Ok(number) => println!("Number before={number}"),
            Err(status) => println!("Error! Can't update number: {status}"),
        }
        match simple_class.number() {
            Ok(number) => println!("Number after={number}"),
            Err(status) => println!("Error! Can't get number: {status}"),
        }
    }
    Status::SUCCESS
}

fn uninstall(handle: Handle) {
    println!("Bye-bye from SimpleClassProtocol driver, handle={:p}", handle.as_ptr());
    // SAFETY: the interface was installed by `install` and nothing holds it open.
    let result = unsafe {
        boot::uninstall_protocol_interface(
            handle,
            &SimpleClass::GUID,
            (&raw const INTERFACE).cast::<c_void>(),
        )
    };
    if let Err(e) = result {
        error!("Can't uninstall SimpleClass protocol: {}", e.status());
    }
}
