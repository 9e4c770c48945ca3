fn main() {}

pub mod block_in_main {
    pub mod a {
        pub mod b {
            pub mod c_file;
        }
    }
}

pub mod file_in_main;
