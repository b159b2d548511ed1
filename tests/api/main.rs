mod helpers;

mod login;
mod orders;
mod registration;
mod tables;
