mod dashboard_test;
