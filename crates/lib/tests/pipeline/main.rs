
mod compressed_tests;
mod init_package_tests;
mod packages_tests;
