pub mod dashboarddtos;
