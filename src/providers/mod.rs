pub mod powerdns;
