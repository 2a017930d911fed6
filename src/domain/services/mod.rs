pub mod manual_check_in;
pub mod notification;
pub mod qr_image;
pub mod redemption;
pub mod schedule;
pub mod token_issuer;

#[cfg(test)]
pub(crate) mod fakes;
