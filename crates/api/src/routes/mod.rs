pub mod stocks;
