//! Kiosk borrow/return calls with hot-potato tokens as owned values.
//!
//! Each borrow hands back a [`Borrowed`] value and its [`Receipt`]. Neither is
//! `Clone`, and the return functions take both by value, so a block that
//! returns an item before transferring it, or forgets a return, does not
//! type-check. [`super::linear::verify_linear`] checks the same thing again on
//! the finished graph.

use std::marker::PhantomData;

use crate::types::{MatchedAsset, ObjectId, SuiAddress};

use super::{Argument, Command, GraphBuilder, MoveCall, PureValue, Usage};

pub const KIOSK_MODULE: &str = "0x2::kiosk";
pub const PERSONAL_KIOSK_MODULE: &str = "personal_kiosk";

/// Marker for the kiosk owner cap lent out by a personal kiosk cap.
#[derive(Debug)]
pub struct OwnerCapKind;

/// Marker for an item lent out by a kiosk.
#[derive(Debug)]
pub struct ItemKind;

#[must_use = "a borrowed value has to be returned in the same transaction"]
#[derive(Debug)]
pub struct Borrowed<K> {
    arg: Argument,
    _kind: PhantomData<K>,
}

impl<K> Borrowed<K> {
    pub fn argument(&self) -> Argument {
        self.arg
    }
}

#[must_use = "a borrow receipt has to be consumed in the same transaction"]
#[derive(Debug)]
pub struct Receipt<K> {
    arg: Argument,
    _kind: PhantomData<K>,
}

fn borrowed_pair<K>(command: u16) -> (Borrowed<K>, Receipt<K>) {
    (
        Borrowed {
            arg: Argument::NestedResult {
                index: command,
                result_index: 0,
            },
            _kind: PhantomData,
        },
        Receipt {
            arg: Argument::NestedResult {
                index: command,
                result_index: 1,
            },
            _kind: PhantomData,
        },
    )
}

fn move_call(target: String, type_arguments: Vec<String>, arguments: Vec<Argument>) -> Command {
    Command::MoveCall(MoveCall {
        target,
        type_arguments,
        arguments,
    })
}

/// `personal_kiosk::borrow_val(personal_cap)`
pub fn personal_kiosk_borrow(
    builder: &mut GraphBuilder,
    package: &ObjectId,
    personal_cap: &ObjectId,
) -> (Borrowed<OwnerCapKind>, Receipt<OwnerCapKind>) {
    let cap = builder.object(personal_cap);
    let index = builder.command(
        move_call(
            format!("{package}::{PERSONAL_KIOSK_MODULE}::borrow_val"),
            Vec::new(),
            vec![cap],
        ),
        Usage {
            linear_results: 2,
            ..Default::default()
        },
    );
    borrowed_pair(index)
}

/// `0x2::kiosk::borrow_val<T>(kiosk, cap, item_id)`
pub fn kiosk_borrow(
    builder: &mut GraphBuilder,
    kiosk: &ObjectId,
    cap: &Borrowed<OwnerCapKind>,
    item_id: &ObjectId,
    item_type: &str,
) -> (Borrowed<ItemKind>, Receipt<ItemKind>) {
    let kiosk = builder.object(kiosk);
    let item = builder.pure(PureValue::Id(item_id.clone()));
    let index = builder.command(
        move_call(
            format!("{KIOSK_MODULE}::borrow_val"),
            vec![item_type.to_string()],
            vec![kiosk, cap.arg, item],
        ),
        Usage {
            linear_results: 2,
            borrows: vec![cap.arg],
            ..Default::default()
        },
    );
    borrowed_pair(index)
}

/// Transfer a borrowed item while its receipt is still outstanding.
pub fn transfer_borrowed(
    builder: &mut GraphBuilder,
    item: &Borrowed<ItemKind>,
    recipient: &SuiAddress,
) {
    let address = builder.pure(PureValue::Address(*recipient));
    builder.command(
        Command::TransferObjects {
            objects: vec![item.arg],
            address,
        },
        Usage {
            borrows: vec![item.arg],
            ..Default::default()
        },
    );
}

/// `0x2::kiosk::return_val<T>(kiosk, item, receipt)`
pub fn kiosk_return(
    builder: &mut GraphBuilder,
    kiosk: &ObjectId,
    item_type: &str,
    item: Borrowed<ItemKind>,
    receipt: Receipt<ItemKind>,
) {
    let kiosk = builder.object(kiosk);
    builder.command(
        move_call(
            format!("{KIOSK_MODULE}::return_val"),
            vec![item_type.to_string()],
            vec![kiosk, item.arg, receipt.arg],
        ),
        Usage {
            consumes: vec![item.arg, receipt.arg],
            ..Default::default()
        },
    );
}

/// `personal_kiosk::return_val(personal_cap, cap, receipt)`
pub fn personal_kiosk_return(
    builder: &mut GraphBuilder,
    package: &ObjectId,
    personal_cap: &ObjectId,
    cap: Borrowed<OwnerCapKind>,
    receipt: Receipt<OwnerCapKind>,
) {
    let personal_cap = builder.object(personal_cap);
    builder.command(
        move_call(
            format!("{package}::{PERSONAL_KIOSK_MODULE}::return_val"),
            Vec::new(),
            vec![personal_cap, cap.arg, receipt.arg],
        ),
        Usage {
            consumes: vec![cap.arg, receipt.arg],
            ..Default::default()
        },
    );
}

/// Append the five-command block that lifts `asset` out of its personal kiosk
/// and sends it to `destination`.
pub fn append_unlock_transfer(
    builder: &mut GraphBuilder,
    asset: &MatchedAsset,
    personal_kiosk_package: &ObjectId,
    item_type: &str,
    destination: &SuiAddress,
) {
    let (cap, cap_receipt) =
        personal_kiosk_borrow(builder, personal_kiosk_package, &asset.personal_kiosk_cap_id);
    let (item, item_receipt) = kiosk_borrow(builder, &asset.kiosk_id, &cap, &asset.id, item_type);
    transfer_borrowed(builder, &item, destination);
    kiosk_return(builder, &asset.kiosk_id, item_type, item, item_receipt);
    personal_kiosk_return(
        builder,
        personal_kiosk_package,
        &asset.personal_kiosk_cap_id,
        cap,
        cap_receipt,
    );
}
