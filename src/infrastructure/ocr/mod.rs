pub mod http_ocr_engine;
