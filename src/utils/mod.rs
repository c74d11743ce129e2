pub mod top_list;
