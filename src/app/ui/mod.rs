pub(super) mod create;
pub(super) mod dialogs;
pub(super) mod feed;
pub(super) mod nav;
