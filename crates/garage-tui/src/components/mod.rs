pub mod vehicle_detail;
pub mod vehicle_list;
