pub mod s3_image_cdn;
