
mod catalog_test;
mod http_test;
mod purchase_test;
mod user_test;
